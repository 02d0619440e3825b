//! Profit calculations for rideshare and delivery shifts.
//!
//! [`metrics`] derives the per-day figures from a snapshot of driver input;
//! [`aggregate`] reduces saved days into statistics and period summaries.

pub mod aggregate;
pub mod common;
pub mod metrics;

pub use aggregate::{Period, PeriodSummary, Statistics, aggregate, summarize_period};
pub use metrics::{DerivedMetrics, HealthTier, WEAR_AND_TEAR_PER_MILE, compute_metrics};
