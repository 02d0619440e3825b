//! Turning what the driver typed into numbers.
//!
//! Field input is lenient: a blank or unreadable field counts as zero and
//! the calculation carries on. Only the strict [`parse_decimal`] reports
//! failures, for callers that want to reject bad input outright.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::warn;

use crate::models::{DriverInputSnapshot, LineItems};

/// A non-empty string that is not a number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid decimal '{input}': {reason}")]
pub struct ParseDecimalError {
    input: String,
    reason: String,
}

impl ParseDecimalError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Trims whitespace, a leading `$` and thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed);
    unsigned.trim().replace(',', "")
}

/// Parses a number such as `"1,234.56"` or `"$12.50"`. Blank input is zero.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|e| ParseDecimalError {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

/// Like [`parse_decimal`] but substitutes zero for unreadable input.
///
/// `field` names the input in the warning that is logged when this happens.
pub fn decimal_or_zero(
    field: &str,
    s: &str,
) -> Decimal {
    parse_decimal(s).unwrap_or_else(|e| {
        warn!(field, input = %e.input(), "Unreadable number, using 0");
        Decimal::ZERO
    })
}

/// Reads an odometer field as whole miles, dropping any fraction.
///
/// Unreadable input, and readings too large for an `i64`, count as zero.
pub fn odometer_or_zero(
    field: &str,
    s: &str,
) -> i64 {
    decimal_or_zero(field, s).trunc().to_i64().unwrap_or_else(|| {
        warn!(field, input = %s, "Odometer reading out of range, using 0");
        0
    })
}

/// The text fields of the calculator, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotForm {
    pub fuel_economy: String,
    pub fuel_price: String,
    pub daily_goal: String,
    pub uber_earnings: String,
    pub lyft_earnings: String,
    pub cash_tips: String,
    pub odometer_start: String,
    pub odometer_end: String,
    pub food_cost: String,
    pub misc_cost: String,
}

impl SnapshotForm {
    /// Fills the form from a snapshot so a saved day can be edited again.
    pub fn from_snapshot(snapshot: &DriverInputSnapshot) -> Self {
        Self {
            fuel_economy: snapshot.fuel_economy.to_string(),
            fuel_price: snapshot.fuel_price.to_string(),
            daily_goal: snapshot.daily_goal.to_string(),
            uber_earnings: snapshot.uber_earnings.to_string(),
            lyft_earnings: snapshot.lyft_earnings.to_string(),
            cash_tips: snapshot.cash_tips.to_string(),
            odometer_start: snapshot.odometer_start.to_string(),
            odometer_end: snapshot.odometer_end.to_string(),
            food_cost: snapshot.food_cost.to_string(),
            misc_cost: snapshot.misc_cost.to_string(),
        }
    }

    /// Reads every field leniently and attaches the given line items.
    pub fn to_snapshot(
        &self,
        extra_income: LineItems,
        adhoc_expenses: LineItems,
    ) -> DriverInputSnapshot {
        DriverInputSnapshot {
            fuel_economy: decimal_or_zero("fuel_economy", &self.fuel_economy),
            fuel_price: decimal_or_zero("fuel_price", &self.fuel_price),
            daily_goal: decimal_or_zero("daily_goal", &self.daily_goal),
            uber_earnings: decimal_or_zero("uber_earnings", &self.uber_earnings),
            lyft_earnings: decimal_or_zero("lyft_earnings", &self.lyft_earnings),
            cash_tips: decimal_or_zero("cash_tips", &self.cash_tips),
            extra_income,
            odometer_start: odometer_or_zero("odometer_start", &self.odometer_start),
            odometer_end: odometer_or_zero("odometer_end", &self.odometer_end),
            food_cost: decimal_or_zero("food_cost", &self.food_cost),
            misc_cost: decimal_or_zero("misc_cost", &self.misc_cost),
            adhoc_expenses,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_separators_and_currency_sign() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal(" $12.50 ").unwrap(), dec!(12.50));
        assert_eq!(parse_decimal("-3").unwrap(), dec!(-3));
    }

    #[test]
    fn parse_decimal_blank_is_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_rejects_text() {
        let err = parse_decimal("abc").unwrap_err();
        assert_eq!(err.input(), "abc");
    }

    #[test]
    fn decimal_or_zero_substitutes_zero() {
        assert_eq!(decimal_or_zero("uber_earnings", "twelve"), Decimal::ZERO);
        assert_eq!(decimal_or_zero("uber_earnings", "12"), dec!(12));
    }

    #[test]
    fn odometer_truncates_fraction() {
        assert_eq!(odometer_or_zero("odometer_end", "1150.9"), 1150);
        assert_eq!(odometer_or_zero("odometer_end", "x"), 0);
        assert_eq!(odometer_or_zero("odometer_end", ""), 0);
    }

    #[test]
    fn form_to_snapshot_reads_every_field() {
        let form = SnapshotForm {
            fuel_economy: "30".into(),
            fuel_price: "3.00".into(),
            daily_goal: "200".into(),
            uber_earnings: "180".into(),
            lyft_earnings: "70".into(),
            cash_tips: "oops".into(),
            odometer_start: "1000".into(),
            odometer_end: "1150".into(),
            food_cost: "12.5".into(),
            misc_cost: "".into(),
        };

        let snapshot = form.to_snapshot(LineItems::new(), LineItems::new());

        assert_eq!(snapshot.fuel_economy, dec!(30));
        assert_eq!(snapshot.uber_earnings, dec!(180));
        assert_eq!(snapshot.cash_tips, Decimal::ZERO);
        assert_eq!(snapshot.odometer_start, 1000);
        assert_eq!(snapshot.odometer_end, 1150);
        assert_eq!(snapshot.food_cost, dec!(12.5));
        assert_eq!(snapshot.misc_cost, Decimal::ZERO);
    }

    #[test]
    fn form_round_trips_through_snapshot() {
        let mut adhoc = LineItems::new();
        adhoc.add("Car wash", dec!(8)).unwrap();
        let snapshot = DriverInputSnapshot {
            fuel_economy: dec!(35.0),
            fuel_price: dec!(3.10),
            daily_goal: dec!(200.00),
            uber_earnings: dec!(95.25),
            odometer_start: 42000,
            odometer_end: 42120,
            adhoc_expenses: adhoc.clone(),
            ..Default::default()
        };

        let form = SnapshotForm::from_snapshot(&snapshot);

        assert_eq!(form.to_snapshot(LineItems::new(), adhoc), snapshot);
    }
}
