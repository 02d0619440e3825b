//! Summary statistics over saved daily records.
//!
//! [`aggregate`] reduces any set of records into totals and an average daily
//! profit. [`summarize_period`] narrows a set of records to one calendar week
//! or month and measures it against the daily goal scaled to that period.
//!
//! Both are pure and order-independent: which records are passed in decides
//! the result, not the order they arrive in.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DailyRecord;
use crate::calculations::common::{percent_of, ratio_or_zero};

/// Totals and averages over a set of daily records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of days recorded.
    pub count: usize,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,

    /// Average net profit per recorded day, zero when there are no records.
    pub average_daily_profit: Decimal,
    pub total_miles: Decimal,
    pub total_fuel_cost: Decimal,
}

/// Reduces `records` into [`Statistics`].
///
/// The empty input yields all zeros, including the average.
pub fn aggregate<'a, I>(records: I) -> Statistics
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut stats = records
        .into_iter()
        .fold(Statistics::default(), |mut acc, record| {
            let m = &record.metrics;
            acc.count += 1;
            acc.total_income = acc.total_income.saturating_add(m.gross_income);
            acc.total_expenses = acc.total_expenses.saturating_add(m.total_expenses);
            acc.total_profit = acc.total_profit.saturating_add(m.net_profit);
            acc.total_miles = acc.total_miles.saturating_add(m.miles_driven);
            acc.total_fuel_cost = acc.total_fuel_cost.saturating_add(m.fuel_cost);
            acc
        });

    stats.average_daily_profit = ratio_or_zero(stats.total_profit, Decimal::from(stats.count));
    stats
}

/// A calendar span used for period summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// Monday through Sunday.
    Week,
    /// First through last day of the month.
    Month,
}

impl Period {
    /// First and last day (inclusive) of the period containing `date`.
    pub fn bounds(
        &self,
        date: NaiveDate,
    ) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Week => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                let start = date - Days::new(offset);
                (start, start + Days::new(6))
            }
            Self::Month => {
                let start = date.with_day(1).unwrap_or(date);
                let end = (start + Months::new(1)) - Days::new(1);
                (start, end)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// How a week or month went against the scaled daily goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub start: NaiveDate,
    pub end: NaiveDate,

    /// Calendar days in the period (7 for a week, 28-31 for a month).
    pub days_in_period: u32,

    pub statistics: Statistics,

    /// Daily goal × days in the period.
    pub period_goal: Decimal,

    /// Total net profit minus the period goal.
    pub goal_delta: Decimal,

    /// Total net profit as a percentage of the period goal; zero without a goal.
    pub goal_percent: Decimal,
}

/// Summarizes the records that fall inside the `period` containing `anchor`.
///
/// Records outside the period bounds are ignored, so callers may pass a
/// wider listing than the period itself.
pub fn summarize_period<'a, I>(
    period: Period,
    anchor: NaiveDate,
    records: I,
    daily_goal: Decimal,
) -> PeriodSummary
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let (start, end) = period.bounds(anchor);
    let days_in_period = u32::try_from((end - start).num_days() + 1).unwrap_or(0);

    let statistics = aggregate(
        records
            .into_iter()
            .filter(|r| r.date >= start && r.date <= end),
    );

    let period_goal = daily_goal.saturating_mul(Decimal::from(days_in_period));
    let goal_delta = statistics.total_profit.saturating_sub(period_goal);
    let goal_percent = if period_goal > Decimal::ZERO {
        percent_of(statistics.total_profit, period_goal)
    } else {
        Decimal::ZERO
    };

    PeriodSummary {
        period,
        start,
        end,
        days_in_period,
        statistics,
        period_goal,
        goal_delta,
        goal_percent,
    }
}
