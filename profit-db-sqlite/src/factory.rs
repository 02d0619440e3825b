use async_trait::async_trait;
use profit_core::db::{DailyRecordRepository, DbConfig, RepositoryError, RepositoryFactory};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`profit_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use profit_core::db::RepositoryRegistry;
/// use profit_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens `config.connection_string` (see [`SqliteRepository::new`]) and
    /// runs the migrations. Any failure is reported as
    /// [`RepositoryError::StorageUnavailable`].
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DailyRecordRepository>, RepositoryError> {
        let repo = SqliteRepository::open(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::StorageUnavailable(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
