pub mod calculations;
pub mod db;
pub mod display;
pub mod input;
pub mod models;

pub use db::repository::{DailyRecordRepository, RepositoryError};
pub use models::*;
