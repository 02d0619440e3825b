use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Per-vehicle defaults that pre-fill a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub fuel_economy: Decimal,
    pub fuel_price: Decimal,
    pub daily_goal: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            fuel_economy: dec!(35.0),
            fuel_price: dec!(3.10),
            daily_goal: dec!(200.00),
            updated_at: None,
        }
    }
}
