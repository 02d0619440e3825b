pub mod factory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{DEFAULT_HISTORY_LIMIT, DailyRecordRepository, RepositoryError};
