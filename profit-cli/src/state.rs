//! The calculator session.
//!
//! A [`Session`] owns the inputs being edited, the metrics last derived from
//! them, and the record store handle if one could be opened. Everything the
//! driver can do goes through it; there is no global state.

use chrono::{Local, NaiveDate, Utc};
use profit_core::calculations::{
    DerivedMetrics, Period, PeriodSummary, Statistics, aggregate, compute_metrics,
    summarize_period,
};
use profit_core::display::MetricsView;
use profit_core::input::SnapshotForm;
use profit_core::{
    DailyRecord, DailyRecordRepository, DriverInputSnapshot, LineItem, LineItemError,
    RepositoryError, VehicleConfig,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

pub struct Session {
    inputs: DriverInputSnapshot,
    metrics: DerivedMetrics,
    store: Option<Box<dyn DailyRecordRepository>>,
}

impl Session {
    /// A session over `store`, seeded with built-in vehicle defaults.
    pub fn new(store: Option<Box<dyn DailyRecordRepository>>) -> Self {
        let inputs = DriverInputSnapshot::from_vehicle(&VehicleConfig::default());
        let metrics = compute_metrics(&inputs);
        Self {
            inputs,
            metrics,
            store,
        }
    }

    /// A session whose vehicle fields come from the store's saved defaults.
    ///
    /// A failing store is logged and left in place; calculation still works.
    pub async fn with_vehicle_defaults(store: Option<Box<dyn DailyRecordRepository>>) -> Self {
        let mut session = Self::new(store);
        if session.has_store() {
            match session.vehicle_config().await {
                Ok(config) => session.apply_vehicle_defaults(&config),
                Err(e) => warn!(error = %e, "Could not read vehicle defaults"),
            }
        }
        session
    }

    /// Opens a session the way the app starts: vehicle defaults from the
    /// store, then `today`'s saved record, if any, restored for editing.
    pub async fn start(
        store: Option<Box<dyn DailyRecordRepository>>,
        today: NaiveDate,
    ) -> Self {
        let mut session = Self::with_vehicle_defaults(store).await;
        if session.has_store() {
            if let Err(e) = session.load(today).await {
                warn!(error = %e, date = %today, "Could not restore today's record");
            }
        }
        session
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn store(&self) -> Result<&dyn DailyRecordRepository, RepositoryError> {
        self.store.as_deref().ok_or_else(|| {
            RepositoryError::StorageUnavailable("no record store is open".to_string())
        })
    }

    pub fn inputs(&self) -> &DriverInputSnapshot {
        &self.inputs
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn view(&self) -> MetricsView {
        MetricsView::new(&self.metrics)
    }

    // --- Editing ---

    /// Re-derives the metrics from the current inputs.
    pub fn recalculate(&mut self) -> &DerivedMetrics {
        self.metrics = compute_metrics(&self.inputs);
        &self.metrics
    }

    /// Replaces the scalar fields from text input. Line items are kept.
    pub fn apply_form(
        &mut self,
        form: &SnapshotForm,
    ) -> &DerivedMetrics {
        let extra_income = std::mem::take(&mut self.inputs.extra_income);
        let adhoc_expenses = std::mem::take(&mut self.inputs.adhoc_expenses);
        self.inputs = form.to_snapshot(extra_income, adhoc_expenses);
        self.recalculate()
    }

    pub fn apply_vehicle_defaults(
        &mut self,
        config: &VehicleConfig,
    ) {
        self.inputs.fuel_economy = config.fuel_economy;
        self.inputs.fuel_price = config.fuel_price;
        self.inputs.daily_goal = config.daily_goal;
        self.recalculate();
    }

    pub fn add_adhoc_expense(
        &mut self,
        label: &str,
        amount: Decimal,
    ) -> Result<(), LineItemError> {
        self.inputs.adhoc_expenses.add(label, amount)?;
        self.recalculate();
        Ok(())
    }

    pub fn remove_adhoc_expense(
        &mut self,
        index: usize,
    ) -> Option<LineItem> {
        let removed = self.inputs.adhoc_expenses.remove(index);
        self.recalculate();
        removed
    }

    pub fn add_extra_income(
        &mut self,
        label: &str,
        amount: Decimal,
    ) -> Result<(), LineItemError> {
        self.inputs.extra_income.add(label, amount)?;
        self.recalculate();
        Ok(())
    }

    pub fn remove_extra_income(
        &mut self,
        index: usize,
    ) -> Option<LineItem> {
        let removed = self.inputs.extra_income.remove(index);
        self.recalculate();
        removed
    }

    // --- Persistence ---

    pub async fn save_today(&self) -> Result<DailyRecord, RepositoryError> {
        self.save_for(Local::now().date_naive()).await
    }

    /// Saves the current inputs as the record for `date`, replacing any
    /// record already saved for that date.
    pub async fn save_for(
        &self,
        date: NaiveDate,
    ) -> Result<DailyRecord, RepositoryError> {
        let record = DailyRecord::new(date, self.inputs.clone(), Utc::now());
        self.store()?.upsert(&record).await?;
        Ok(record)
    }

    /// Restores the inputs saved for `date`. Returns `false`, leaving the
    /// session untouched, when nothing was saved that day.
    pub async fn load(
        &mut self,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        match self.store()?.get(date).await? {
            Some(record) => {
                info!(date = %date, "Restored saved record");
                self.inputs = record.inputs;
                self.recalculate();
                Ok(true)
            }
            None => {
                debug!(date = %date, "No saved record");
                Ok(false)
            }
        }
    }

    pub async fn get_record(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, RepositoryError> {
        self.store()?.get(date).await
    }

    pub async fn list_history(
        &self,
        limit: u32,
    ) -> Result<Vec<DailyRecord>, RepositoryError> {
        self.store()?.list_recent(limit).await
    }

    /// Statistics over the `limit` most recent records.
    pub async fn show_statistics(
        &self,
        limit: u32,
    ) -> Result<Statistics, RepositoryError> {
        let records = self.list_history(limit).await?;
        Ok(aggregate(&records))
    }

    /// The week or month containing `anchor`, measured against the current daily goal.
    pub async fn period_summary(
        &self,
        period: Period,
        anchor: NaiveDate,
    ) -> Result<PeriodSummary, RepositoryError> {
        let (start, end) = period.bounds(anchor);
        let records = self.store()?.list_range(start, end).await?;
        Ok(summarize_period(
            period,
            anchor,
            &records,
            self.inputs.daily_goal,
        ))
    }

    pub async fn delete_record(
        &self,
        date: NaiveDate,
    ) -> Result<(), RepositoryError> {
        self.store()?.delete(date).await
    }

    pub async fn vehicle_config(&self) -> Result<VehicleConfig, RepositoryError> {
        self.store()?.get_vehicle_config().await
    }

    /// Stores new vehicle defaults and applies them to the current inputs.
    pub async fn update_vehicle_config(
        &mut self,
        mut config: VehicleConfig,
    ) -> Result<VehicleConfig, RepositoryError> {
        config.updated_at = Some(Utc::now());
        self.store()?.update_vehicle_config(&config).await?;
        self.apply_vehicle_defaults(&config);
        Ok(config)
    }
}
