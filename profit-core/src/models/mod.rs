mod daily_record;
mod line_item;
mod snapshot;
mod vehicle_config;

pub use daily_record::{DATE_FORMAT, DailyRecord};
pub use line_item::{LineItem, LineItemError, LineItems};
pub use snapshot::DriverInputSnapshot;
pub use vehicle_config::VehicleConfig;
