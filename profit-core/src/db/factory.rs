use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{DailyRecordRepository, RepositoryError};

/// Where the daily records live.
///
/// `backend` names a registered [`RepositoryFactory`]; `connection_string`
/// is handed to that factory untouched.
///
/// | backend    | connection_string examples                      |
/// |------------|-------------------------------------------------|
/// | `sqlite`   | `driver-profit.db`, `:memory:`, `sqlite://x.db` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    pub const DEFAULT_BACKEND: &'static str = "sqlite";
    pub const DEFAULT_CONNECTION: &'static str = "driver-profit.db";

    pub fn sqlite(connection_string: impl Into<String>) -> Self {
        Self {
            backend: Self::DEFAULT_BACKEND.to_string(),
            connection_string: connection_string.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::sqlite(Self::DEFAULT_CONNECTION)
    }
}

/// Opens a repository for one storage backend.
///
/// Backend crates export a unit struct implementing this and the binary
/// registers it with a [`RepositoryRegistry`] at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase identifier, e.g. `"sqlite"`.
    fn backend_name(&self) -> &'static str;

    /// Opens the store and brings its schema up to date. The returned
    /// repository is ready for reads and writes.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DailyRecordRepository>, RepositoryError>;
}

/// Factories keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Adds `factory`, replacing any factory already registered under the
    /// same backend name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no factory has that name.
    /// * Whatever the chosen factory returns, typically
    ///   [`RepositoryError::StorageUnavailable`].
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn DailyRecordRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        tracing::debug!(
            backend = %config.backend,
            connection = %config.connection_string,
            "Opening record store"
        );
        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::{
        DailyRecordRepository, DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry,
    };
    use crate::models::{DailyRecord, VehicleConfig};

    // Routing tests never touch the repository itself.
    struct StubRepository;

    #[async_trait]
    impl DailyRecordRepository for StubRepository {
        async fn upsert(
            &self,
            _record: &DailyRecord,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get(
            &self,
            _date: NaiveDate,
        ) -> Result<Option<DailyRecord>, RepositoryError> {
            unimplemented!()
        }
        async fn list_recent(
            &self,
            _limit: u32,
        ) -> Result<Vec<DailyRecord>, RepositoryError> {
            unimplemented!()
        }
        async fn list_range(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<DailyRecord>, RepositoryError> {
            unimplemented!()
        }
        async fn latest(&self) -> Result<Option<DailyRecord>, RepositoryError> {
            unimplemented!()
        }
        async fn delete(
            &self,
            _date: NaiveDate,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn get_vehicle_config(&self) -> Result<VehicleConfig, RepositoryError> {
            unimplemented!()
        }
        async fn update_vehicle_config(
            &self,
            _config: &VehicleConfig,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
    }

    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn DailyRecordRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct UnreachableFactory;

    #[async_trait]
    impl RepositoryFactory for UnreachableFactory {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }
        async fn create(
            &self,
            config: &DbConfig,
        ) -> Result<Box<dyn DailyRecordRepository>, RepositoryError> {
            Err(RepositoryError::StorageUnavailable(format!(
                "cannot open {}",
                config.connection_string
            )))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    // =========================================================================
    // DbConfig tests
    // =========================================================================

    #[test]
    fn default_config_is_sqlite_file() {
        let cfg = DbConfig::default();

        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, "driver-profit.db");
    }

    #[test]
    fn sqlite_helper_keeps_connection_string() {
        assert_eq!(DbConfig::sqlite(":memory:"), config("sqlite"));
    }

    // =========================================================================
    // Registration tests
    // =========================================================================

    #[test]
    fn new_registry_is_empty() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
        assert!(RepositoryRegistry::default().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted() {
        let mut reg = RepositoryRegistry::new();
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("memory");
        reg.register(f1);
        reg.register(f2);

        assert_eq!(reg.available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = RepositoryRegistry::new();
        let (old, _) = stub_factory("sqlite");
        let (new, _) = stub_factory("sqlite");
        reg.register(old);
        reg.register(new);

        assert_eq!(reg.available_backends(), vec!["sqlite"]);
    }

    // =========================================================================
    // Dispatch tests
    // =========================================================================

    #[tokio::test]
    async fn create_calls_only_matching_factory() {
        let mut reg = RepositoryRegistry::new();
        let (sqlite, sqlite_called) = stub_factory("sqlite");
        let (memory, memory_called) = stub_factory("memory");
        reg.register(sqlite);
        reg.register(memory);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!memory_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_names_requested_and_available() {
        let mut reg = RepositoryRegistry::new();
        let (f, _) = stub_factory("sqlite");
        reg.register(f);

        match reg.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"), "got: {msg}");
                assert!(msg.contains("sqlite"), "got: {msg}");
            }
            Err(other) => panic!("expected Configuration error, got {other:?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn create_propagates_storage_unavailable() {
        let mut reg = RepositoryRegistry::new();
        reg.register(Box::new(UnreachableFactory));

        match reg.create(&config("unreachable")).await {
            Err(err) => assert_eq!(
                err,
                RepositoryError::StorageUnavailable("cannot open :memory:".to_string())
            ),
            Ok(_) => panic!("expected StorageUnavailable"),
        }
    }
}
