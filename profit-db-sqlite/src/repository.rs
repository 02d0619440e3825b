use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use profit_core::calculations::{DerivedMetrics, HealthTier};
use profit_core::{
    DATE_FORMAT, DailyRecord, DailyRecordRepository, DriverInputSnapshot, LineItem, LineItems,
    RepositoryError, VehicleConfig,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

const LINE_ITEM_EXPENSE: &str = "expense";
const LINE_ITEM_INCOME: &str = "income";

const RECORD_COLUMNS: &str = "date, fuel_economy, fuel_price, daily_goal,
    uber_earnings, lyft_earnings, cash_tips, odometer_start, odometer_end,
    food_cost, misc_cost, gross_income, extra_income_total, miles_driven,
    odometer_unreliable, fuel_volume, fuel_cost, wear_and_tear, adhoc_total,
    total_expenses, net_profit, expense_ratio, goal_delta, goal_progress,
    health, goal_reached, created_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects without touching the schema.
    ///
    /// `connection_string` may be `:memory:`, a `sqlite:` URL, or a plain
    /// file path. A plain path is created if it does not exist.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let pool = if is_in_memory(connection_string) {
            // Every connection to `:memory:` is its own database; keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
        } else {
            let options = if connection_string.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(connection_string).with_context(|| {
                    format!("Invalid SQLite connection string: {}", connection_string)
                })?
            } else {
                SqliteConnectOptions::new()
                    .filename(connection_string)
                    .create_if_missing(true)
            };
            SqlitePoolOptions::new().connect_with(options).await
        }
        .with_context(|| format!("Failed to connect to database: {}", connection_string))?;

        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Connects and brings the schema up to date. The store is not usable
    /// until this has succeeded.
    pub async fn open(connection_string: &str) -> Result<Self> {
        let repo = Self::new(connection_string).await?;
        repo.run_migrations().await?;
        info!(database = %connection_string, "Record store ready");
        Ok(repo)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn hydrate(
        &self,
        rows: Vec<SqliteRow>,
    ) -> Result<Vec<DailyRecord>, RepositoryError> {
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = row_to_daily_record(row)?;
            let (extra_income, adhoc_expenses) = self.line_items(&record.date_key()).await?;
            record.inputs.extra_income = extra_income;
            record.inputs.adhoc_expenses = adhoc_expenses;
            records.push(record);
        }
        Ok(records)
    }

    /// Extra income and ad-hoc expenses for one date, in entry order.
    async fn line_items(
        &self,
        date_key: &str,
    ) -> Result<(LineItems, LineItems), RepositoryError> {
        let rows = sqlx::query(
            "SELECT kind, label, amount FROM line_items
             WHERE record_date = ?
             ORDER BY kind, position",
        )
        .bind(date_key)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let mut income = Vec::new();
        let mut expenses = Vec::new();
        for row in &rows {
            let kind: String = column(row, "kind")?;
            let item = LineItem {
                label: column(row, "label")?,
                amount: get_decimal(row, "amount")?,
            };
            match kind.as_str() {
                LINE_ITEM_INCOME => income.push(item),
                LINE_ITEM_EXPENSE => expenses.push(item),
                other => {
                    return Err(RepositoryError::Database(format!(
                        "Invalid line item kind '{}' for {}",
                        other, date_key
                    )));
                }
            }
        }

        Ok((income.into_iter().collect(), expenses.into_iter().collect()))
    }
}

fn is_in_memory(connection_string: &str) -> bool {
    matches!(connection_string, ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
}

fn unavailable(e: sqlx::Error) -> RepositoryError {
    RepositoryError::StorageUnavailable(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    // Rows written by hand may use SQLite's CURRENT_TIMESTAMP format.
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .map(|naive| naive.and_utc())
        })
        .map_err(|e| RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e)))
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| RepositoryError::Database(format!("Failed to parse date '{}': {}", s, e)))
}

/// Builds a record from a `daily_records` row. Line items are attached separately.
fn row_to_daily_record(row: &SqliteRow) -> Result<DailyRecord, RepositoryError> {
    let date: String = column(row, "date")?;
    let health: String = column(row, "health")?;
    let created_at: String = column(row, "created_at")?;

    let inputs = DriverInputSnapshot {
        fuel_economy: get_decimal(row, "fuel_economy")?,
        fuel_price: get_decimal(row, "fuel_price")?,
        daily_goal: get_decimal(row, "daily_goal")?,
        uber_earnings: get_decimal(row, "uber_earnings")?,
        lyft_earnings: get_decimal(row, "lyft_earnings")?,
        cash_tips: get_decimal(row, "cash_tips")?,
        extra_income: LineItems::new(),
        odometer_start: column(row, "odometer_start")?,
        odometer_end: column(row, "odometer_end")?,
        food_cost: get_decimal(row, "food_cost")?,
        misc_cost: get_decimal(row, "misc_cost")?,
        adhoc_expenses: LineItems::new(),
    };

    let metrics = DerivedMetrics {
        gross_income: get_decimal(row, "gross_income")?,
        extra_income_total: get_decimal(row, "extra_income_total")?,
        miles_driven: get_decimal(row, "miles_driven")?,
        odometer_unreliable: column(row, "odometer_unreliable")?,
        fuel_volume: get_decimal(row, "fuel_volume")?,
        fuel_cost: get_decimal(row, "fuel_cost")?,
        wear_and_tear: get_decimal(row, "wear_and_tear")?,
        adhoc_total: get_decimal(row, "adhoc_total")?,
        total_expenses: get_decimal(row, "total_expenses")?,
        net_profit: get_decimal(row, "net_profit")?,
        expense_ratio: get_decimal(row, "expense_ratio")?,
        goal_delta: get_decimal(row, "goal_delta")?,
        goal_progress: get_optional_decimal(row, "goal_progress")?,
        health: HealthTier::from_name(&health).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid health tier: {}", health))
        })?,
        goal_reached: column(row, "goal_reached")?,
    };

    Ok(DailyRecord {
        date: parse_date(&date)?,
        inputs,
        metrics,
        created_at: parse_timestamp(&created_at)?,
    })
}

async fn insert_line_items(
    tx: &mut Transaction<'_, Sqlite>,
    date_key: &str,
    kind: &str,
    items: &LineItems,
) -> Result<(), RepositoryError> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO line_items (record_date, kind, position, label, amount)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(date_key)
        .bind(kind)
        .bind(position as i64)
        .bind(&item.label)
        .bind(decimal_to_text(item.amount))
        .execute(&mut **tx)
        .await
        .map_err(unavailable)?;
    }
    Ok(())
}

#[async_trait]
impl DailyRecordRepository for SqliteRepository {
    async fn upsert(
        &self,
        record: &DailyRecord,
    ) -> Result<(), RepositoryError> {
        let key = record.date_key();
        let inputs = &record.inputs;
        let metrics = &record.metrics;

        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query(&format!(
            "INSERT INTO daily_records ({RECORD_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(date) DO UPDATE SET
                fuel_economy = excluded.fuel_economy,
                fuel_price = excluded.fuel_price,
                daily_goal = excluded.daily_goal,
                uber_earnings = excluded.uber_earnings,
                lyft_earnings = excluded.lyft_earnings,
                cash_tips = excluded.cash_tips,
                odometer_start = excluded.odometer_start,
                odometer_end = excluded.odometer_end,
                food_cost = excluded.food_cost,
                misc_cost = excluded.misc_cost,
                gross_income = excluded.gross_income,
                extra_income_total = excluded.extra_income_total,
                miles_driven = excluded.miles_driven,
                odometer_unreliable = excluded.odometer_unreliable,
                fuel_volume = excluded.fuel_volume,
                fuel_cost = excluded.fuel_cost,
                wear_and_tear = excluded.wear_and_tear,
                adhoc_total = excluded.adhoc_total,
                total_expenses = excluded.total_expenses,
                net_profit = excluded.net_profit,
                expense_ratio = excluded.expense_ratio,
                goal_delta = excluded.goal_delta,
                goal_progress = excluded.goal_progress,
                health = excluded.health,
                goal_reached = excluded.goal_reached,
                created_at = excluded.created_at"
        ))
        .bind(&key)
        .bind(decimal_to_text(inputs.fuel_economy))
        .bind(decimal_to_text(inputs.fuel_price))
        .bind(decimal_to_text(inputs.daily_goal))
        .bind(decimal_to_text(inputs.uber_earnings))
        .bind(decimal_to_text(inputs.lyft_earnings))
        .bind(decimal_to_text(inputs.cash_tips))
        .bind(inputs.odometer_start)
        .bind(inputs.odometer_end)
        .bind(decimal_to_text(inputs.food_cost))
        .bind(decimal_to_text(inputs.misc_cost))
        .bind(decimal_to_text(metrics.gross_income))
        .bind(decimal_to_text(metrics.extra_income_total))
        .bind(decimal_to_text(metrics.miles_driven))
        .bind(metrics.odometer_unreliable)
        .bind(decimal_to_text(metrics.fuel_volume))
        .bind(decimal_to_text(metrics.fuel_cost))
        .bind(decimal_to_text(metrics.wear_and_tear))
        .bind(decimal_to_text(metrics.adhoc_total))
        .bind(decimal_to_text(metrics.total_expenses))
        .bind(decimal_to_text(metrics.net_profit))
        .bind(decimal_to_text(metrics.expense_ratio))
        .bind(decimal_to_text(metrics.goal_delta))
        .bind(metrics.goal_progress.map(decimal_to_text))
        .bind(metrics.health.as_str())
        .bind(metrics.goal_reached)
        .bind(format_timestamp(&record.created_at))
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        sqlx::query("DELETE FROM line_items WHERE record_date = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        insert_line_items(&mut tx, &key, LINE_ITEM_INCOME, &inputs.extra_income).await?;
        insert_line_items(&mut tx, &key, LINE_ITEM_EXPENSE, &inputs.adhoc_expenses).await?;

        tx.commit().await.map_err(unavailable)?;

        info!(date = %key, net_profit = %metrics.net_profit, "Saved daily record");
        Ok(())
    }

    async fn get(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {RECORD_COLUMNS} FROM daily_records WHERE date = ?"))
            .bind(date_key(date))
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<DailyRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM daily_records ORDER BY date DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        debug!(limit, found = rows.len(), "Listed recent records");
        self.hydrate(rows).await
    }

    async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM daily_records
             WHERE date >= ? AND date <= ?
             ORDER BY date DESC"
        ))
        .bind(date_key(from))
        .bind(date_key(to))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        self.hydrate(rows).await
    }

    async fn latest(&self) -> Result<Option<DailyRecord>, RepositoryError> {
        Ok(self.list_recent(1).await?.pop())
    }

    async fn delete(
        &self,
        date: NaiveDate,
    ) -> Result<(), RepositoryError> {
        let key = date_key(date);
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        sqlx::query("DELETE FROM line_items WHERE record_date = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        let result = sqlx::query("DELETE FROM daily_records WHERE date = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)?;

        if result.rows_affected() == 0 {
            debug!(date = %key, "No record to delete");
        } else {
            info!(date = %key, "Deleted daily record");
        }
        Ok(())
    }

    async fn get_vehicle_config(&self) -> Result<VehicleConfig, RepositoryError> {
        let row = sqlx::query(
            "SELECT fuel_economy, fuel_price, daily_goal, updated_at
             FROM vehicle_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        let Some(row) = row else {
            return Ok(VehicleConfig::default());
        };

        let updated_at: Option<String> = column(&row, "updated_at")?;
        Ok(VehicleConfig {
            fuel_economy: get_decimal(&row, "fuel_economy")?,
            fuel_price: get_decimal(&row, "fuel_price")?,
            daily_goal: get_decimal(&row, "daily_goal")?,
            updated_at: updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }

    async fn update_vehicle_config(
        &self,
        config: &VehicleConfig,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO vehicle_config (id, fuel_economy, fuel_price, daily_goal, updated_at)
             VALUES (1, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                fuel_economy = excluded.fuel_economy,
                fuel_price = excluded.fuel_price,
                daily_goal = excluded.daily_goal,
                updated_at = excluded.updated_at",
        )
        .bind(decimal_to_text(config.fuel_economy))
        .bind(decimal_to_text(config.fuel_price))
        .bind(decimal_to_text(config.daily_goal))
        .bind(config.updated_at.as_ref().map(format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        info!(
            fuel_economy = %config.fuel_economy,
            fuel_price = %config.fuel_price,
            daily_goal = %config.daily_goal,
            "Updated vehicle config"
        );
        Ok(())
    }
}
