use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{LineItems, VehicleConfig};

/// The raw values a driver entered for one calculation.
///
/// Currency fields are in dollars, fuel economy in miles per gallon and fuel
/// price in dollars per gallon. Odometer readings are whole miles; a start
/// reading of 0 means "not entered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInputSnapshot {
    pub fuel_economy: Decimal,
    pub fuel_price: Decimal,

    /// Daily net-profit goal. Zero means no goal.
    pub daily_goal: Decimal,

    // Earnings
    pub uber_earnings: Decimal,
    pub lyft_earnings: Decimal,
    pub cash_tips: Decimal,
    pub extra_income: LineItems,

    // Odometer
    pub odometer_start: i64,
    pub odometer_end: i64,

    // Expenses
    pub food_cost: Decimal,
    pub misc_cost: Decimal,
    pub adhoc_expenses: LineItems,
}

impl DriverInputSnapshot {
    /// An empty snapshot seeded with the vehicle defaults.
    pub fn from_vehicle(config: &VehicleConfig) -> Self {
        Self {
            fuel_economy: config.fuel_economy,
            fuel_price: config.fuel_price,
            daily_goal: config.daily_goal,
            ..Default::default()
        }
    }
}
