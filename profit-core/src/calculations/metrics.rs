//! Daily profit metrics for a rideshare/delivery shift.
//!
//! This module turns a [`DriverInputSnapshot`] into every derived figure the
//! driver sees: income, mileage, fuel, expenses, profit and goal progress.
//!
//! # Derivation
//!
//! | Figure            | Rule |
//! |-------------------|------|
//! | Gross income      | Uber + Lyft + cash tips + extra income |
//! | Miles driven      | End − start, only when end > start and start > 0 |
//! | Fuel volume       | Miles ÷ MPG (0 when MPG is 0) |
//! | Fuel cost         | Fuel volume × price per gallon |
//! | Wear and tear     | Miles × $0.10 (informational, not an expense) |
//! | Total expenses    | Fuel + food + misc + ad-hoc expenses |
//! | Net profit        | Gross income − total expenses |
//! | Expense ratio     | Total expenses ÷ gross income × 100 (0 when no income) |
//! | Goal delta        | Net profit − daily goal |
//! | Goal progress     | Net profit ÷ daily goal, clamped to [0, 1] (only with a goal) |
//!
//! The computation is total: it never fails and never panics. Sums and
//! products saturate at the decimal range rather than overflowing.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use profit_core::DriverInputSnapshot;
//! use profit_core::calculations::{HealthTier, compute_metrics};
//!
//! let snapshot = DriverInputSnapshot {
//!     fuel_economy: dec!(30),
//!     fuel_price: dec!(3.00),
//!     daily_goal: dec!(200),
//!     uber_earnings: dec!(180),
//!     lyft_earnings: dec!(70),
//!     odometer_start: 1000,
//!     odometer_end: 1150,
//!     ..Default::default()
//! };
//!
//! let metrics = compute_metrics(&snapshot);
//!
//! assert_eq!(metrics.miles_driven, dec!(150));
//! assert_eq!(metrics.fuel_cost, dec!(15.00));
//! assert_eq!(metrics.net_profit, dec!(235.00));
//! assert_eq!(metrics.health, HealthTier::Healthy);
//! assert!(metrics.goal_reached);
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DriverInputSnapshot;
use crate::calculations::common::{clamp_fraction, percent_of, ratio_or_zero};

/// Per-mile reserve for maintenance and depreciation.
pub const WEAR_AND_TEAR_PER_MILE: Decimal = dec!(0.10);

/// Expense ratios strictly below this percentage are healthy.
pub const HEALTHY_RATIO_LIMIT: Decimal = dec!(20);

/// Expense ratios up to and including this percentage are a warning; above it, an alert.
pub const WARNING_RATIO_LIMIT: Decimal = dec!(35);

/// Qualitative bucket for the expense ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthTier {
    /// No income yet; nothing to classify.
    Waiting,
    /// Expenses below 20% of income.
    Healthy,
    /// Expenses between 20% and 35% of income, inclusive.
    Warning,
    /// Expenses above 35% of income.
    Alert,
}

impl HealthTier {
    /// Classifies an expense ratio. Only meaningful when there is income.
    pub fn classify(
        gross_income: Decimal,
        expense_ratio: Decimal,
    ) -> Self {
        if gross_income <= Decimal::ZERO {
            Self::Waiting
        } else if expense_ratio < HEALTHY_RATIO_LIMIT {
            Self::Healthy
        } else if expense_ratio <= WARNING_RATIO_LIMIT {
            Self::Warning
        } else {
            Self::Alert
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Alert => "alert",
        }
    }

    /// Inverse of [`HealthTier::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "waiting" => Some(Self::Waiting),
            "healthy" => Some(Self::Healthy),
            "warning" => Some(Self::Warning),
            "alert" => Some(Self::Alert),
            _ => None,
        }
    }

    /// Whether the health panel should be shown at all.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Sum of all earning fields.
    pub gross_income: Decimal,

    /// Sum of the extra income entries (already included in `gross_income`).
    pub extra_income_total: Decimal,

    pub miles_driven: Decimal,

    /// The end reading was entered but the start reading was left at 0.
    pub odometer_unreliable: bool,

    /// Gallons burned.
    pub fuel_volume: Decimal,
    pub fuel_cost: Decimal,

    /// Informational reserve. Never part of `total_expenses`.
    pub wear_and_tear: Decimal,

    pub adhoc_total: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,

    /// Total expenses as a percentage of gross income.
    pub expense_ratio: Decimal,

    /// Net profit minus the daily goal.
    pub goal_delta: Decimal,

    /// Fraction of the goal achieved in `[0, 1]`; `None` when there is no goal.
    pub goal_progress: Option<Decimal>,

    pub health: HealthTier,
    pub goal_reached: bool,
}

/// Computes every derived figure for `snapshot`.
pub fn compute_metrics(snapshot: &DriverInputSnapshot) -> DerivedMetrics {
    let extra_income_total = snapshot.extra_income.total();
    let gross_income = gross_income(snapshot, extra_income_total);

    let (miles_driven, odometer_unreliable) =
        miles_driven(snapshot.odometer_start, snapshot.odometer_end);

    let fuel_volume = fuel_volume(miles_driven, snapshot.fuel_economy);
    let fuel_cost = fuel_volume.saturating_mul(snapshot.fuel_price);
    let wear_and_tear = wear_and_tear(miles_driven);

    let adhoc_total = snapshot.adhoc_expenses.total();
    let total_expenses = total_expenses(
        fuel_cost,
        snapshot.food_cost,
        snapshot.misc_cost,
        adhoc_total,
    );
    let net_profit = gross_income.saturating_sub(total_expenses);

    let expense_ratio = expense_ratio(total_expenses, gross_income);
    let health = HealthTier::classify(gross_income, expense_ratio);

    let goal = snapshot.daily_goal;
    let goal_delta = net_profit.saturating_sub(goal);
    let goal_progress = goal_progress(net_profit, goal);
    let goal_reached = goal > Decimal::ZERO && net_profit >= goal;

    debug!(
        %gross_income,
        %total_expenses,
        %net_profit,
        %expense_ratio,
        health = health.as_str(),
        "metrics computed"
    );

    DerivedMetrics {
        gross_income,
        extra_income_total,
        miles_driven,
        odometer_unreliable,
        fuel_volume,
        fuel_cost,
        wear_and_tear,
        adhoc_total,
        total_expenses,
        net_profit,
        expense_ratio,
        goal_delta,
        goal_progress,
        health,
        goal_reached,
    }
}

fn gross_income(
    snapshot: &DriverInputSnapshot,
    extra_income_total: Decimal,
) -> Decimal {
    snapshot
        .uber_earnings
        .saturating_add(snapshot.lyft_earnings)
        .saturating_add(snapshot.cash_tips)
        .saturating_add(extra_income_total)
}

/// Returns the mileage and whether the reading looks like a missing start value.
///
/// A start reading of 0 is treated as "not entered", so typing only the end
/// reading never registers as a huge trip.
fn miles_driven(
    odometer_start: i64,
    odometer_end: i64,
) -> (Decimal, bool) {
    if odometer_end > odometer_start && odometer_start > 0 {
        (Decimal::from(odometer_end - odometer_start), false)
    } else {
        (Decimal::ZERO, odometer_end > 0 && odometer_start == 0)
    }
}

fn fuel_volume(
    miles_driven: Decimal,
    fuel_economy: Decimal,
) -> Decimal {
    ratio_or_zero(miles_driven, fuel_economy)
}

fn wear_and_tear(miles_driven: Decimal) -> Decimal {
    miles_driven.saturating_mul(WEAR_AND_TEAR_PER_MILE)
}

fn total_expenses(
    fuel_cost: Decimal,
    food_cost: Decimal,
    misc_cost: Decimal,
    adhoc_total: Decimal,
) -> Decimal {
    fuel_cost
        .saturating_add(food_cost)
        .saturating_add(misc_cost)
        .saturating_add(adhoc_total)
}

/// Only computed against positive income; anything else reads as 0%.
fn expense_ratio(
    total_expenses: Decimal,
    gross_income: Decimal,
) -> Decimal {
    if gross_income > Decimal::ZERO {
        percent_of(total_expenses, gross_income)
    } else {
        Decimal::ZERO
    }
}

fn goal_progress(
    net_profit: Decimal,
    goal: Decimal,
) -> Option<Decimal> {
    (goal > Decimal::ZERO).then(|| clamp_fraction(ratio_or_zero(net_profit, goal)))
}
