use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{DailyRecord, VehicleConfig};

/// Number of days the history and statistics views look back over.
pub const DEFAULT_HISTORY_LIMIT: u32 = 30;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be opened, read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A stored row could not be decoded.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistence for daily records, keyed by calendar date.
///
/// This is the only component allowed to touch persistent state. Absent
/// records are reported as `Ok(None)`, never as an error.
#[async_trait]
pub trait DailyRecordRepository: Send + Sync {
    // Daily records
    /// Writes `record`, replacing any record already stored for its date.
    async fn upsert(&self, record: &DailyRecord) -> Result<(), RepositoryError>;

    async fn get(&self, date: NaiveDate) -> Result<Option<DailyRecord>, RepositoryError>;

    /// Up to `limit` records, most recent date first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<DailyRecord>, RepositoryError>;

    /// Records dated `from..=to`, most recent date first.
    async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, RepositoryError>;

    async fn latest(&self) -> Result<Option<DailyRecord>, RepositoryError>;

    /// Removes the record for `date`. Deleting an absent date succeeds.
    async fn delete(&self, date: NaiveDate) -> Result<(), RepositoryError>;

    // Vehicle defaults
    async fn get_vehicle_config(&self) -> Result<VehicleConfig, RepositoryError>;

    async fn update_vehicle_config(&self, config: &VehicleConfig) -> Result<(), RepositoryError>;
}
