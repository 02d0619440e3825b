//! Text formatting for derived metrics.
//!
//! Figures are rounded half-up only here, at the edge; the stored and
//! computed values keep full precision.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::calculations::{DerivedMetrics, HealthTier, WEAR_AND_TEAR_PER_MILE};

/// `$1234.50`, `-$50.00`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_half_up(value, 2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// `150.0 mi`.
pub fn format_distance(value: Decimal) -> String {
    format!("{:.1} mi", round_half_up(value, 1))
}

/// `4.29 gal`.
pub fn format_volume(value: Decimal) -> String {
    format!("{:.2} gal", round_half_up(value, 2))
}

/// `23.5%`.
pub fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", round_half_up(value, 1))
}

/// One-line verdict for the health panel.
pub fn health_message(
    tier: HealthTier,
    expense_ratio: Decimal,
) -> String {
    let ratio = format_percent(expense_ratio);
    match tier {
        HealthTier::Waiting => "Waiting for income...".to_string(),
        HealthTier::Healthy => format!("HEALTHY: operating costs at {ratio} (very profitable)"),
        HealthTier::Warning => format!("WARNING: operating costs at {ratio} (watch your fuel use)"),
        HealthTier::Alert => format!("ALERT: operating costs at {ratio} (spending too much)"),
    }
}

/// Every figure of [`DerivedMetrics`] as display text, plus which panels to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsView {
    pub gross_income: String,
    pub extra_income: String,
    pub miles_driven: String,
    pub fuel_volume: String,
    pub fuel_cost: String,
    pub wear_and_tear: String,
    pub adhoc_total: String,
    pub total_expenses: String,
    pub net_profit: String,
    pub expense_ratio: String,
    pub goal_delta: String,

    /// `Some` when the goal-progress panel is shown.
    pub goal_progress: Option<String>,

    /// `Some` when the health panel is shown.
    pub health: Option<(HealthTier, String)>,

    pub show_odometer_warning: bool,
    pub show_goal_reached: bool,
}

impl MetricsView {
    pub fn new(metrics: &DerivedMetrics) -> Self {
        let health = metrics
            .health
            .is_visible()
            .then(|| (metrics.health, health_message(metrics.health, metrics.expense_ratio)));

        Self {
            gross_income: format_currency(metrics.gross_income),
            extra_income: format_currency(metrics.extra_income_total),
            miles_driven: format_distance(metrics.miles_driven),
            fuel_volume: format_volume(metrics.fuel_volume),
            fuel_cost: format_currency(metrics.fuel_cost),
            wear_and_tear: format!(
                "{} (reserve at {}/mi, not deducted)",
                format_currency(metrics.wear_and_tear),
                format_currency(WEAR_AND_TEAR_PER_MILE)
            ),
            adhoc_total: format_currency(metrics.adhoc_total),
            total_expenses: format_currency(metrics.total_expenses),
            net_profit: format_currency(metrics.net_profit),
            expense_ratio: format!("-{} of income", format_percent(metrics.expense_ratio)),
            goal_delta: format!("{} vs goal", format_currency(metrics.goal_delta)),
            goal_progress: metrics
                .goal_progress
                .map(|p| format_percent(p.saturating_mul(Decimal::ONE_HUNDRED))),
            health,
            show_odometer_warning: metrics.odometer_unreliable,
            show_goal_reached: metrics.goal_reached,
        }
    }
}
