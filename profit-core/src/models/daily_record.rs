use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::DriverInputSnapshot;
use crate::calculations::{DerivedMetrics, compute_metrics};

/// Format used for the date key, both in storage and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One saved day: the inputs, everything derived from them, and when it was saved.
///
/// The calendar date is the unique key; saving again for the same date
/// replaces the previous record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,

    // User-provided values
    pub inputs: DriverInputSnapshot,

    // Calculated values
    pub metrics: DerivedMetrics,

    pub created_at: DateTime<Utc>,
}

impl DailyRecord {
    /// Builds a record for `date`, deriving the metrics from `inputs`.
    pub fn new(
        date: NaiveDate,
        inputs: DriverInputSnapshot,
        created_at: DateTime<Utc>,
    ) -> Self {
        let metrics = compute_metrics(&inputs);
        Self {
            date,
            inputs,
            metrics,
            created_at,
        }
    }

    /// The ISO `YYYY-MM-DD` key for this record.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
