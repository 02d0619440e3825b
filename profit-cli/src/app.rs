use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use profit_core::db::{DailyRecordRepository, DbConfig, RepositoryRegistry};
use profit_core::input::SnapshotForm;
use profit_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, warn};

use crate::cli::{Cli, Command, ShiftArgs, VehicleAction, parse_labeled_amount};
use crate::config::AppConfig;
use crate::report;
use crate::state::Session;

/// Every storage backend this binary knows about.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Opens the record store, or logs why not and carries on without one.
pub async fn open_store(
    registry: &RepositoryRegistry,
    db_config: &DbConfig,
) -> Option<Box<dyn DailyRecordRepository>> {
    match registry.create(db_config).await {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "Record store unavailable; calculations will not be saved");
            None
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Applies the shift arguments to `session`. Rejected line items are
/// reported on `err` and left out.
fn apply_shift(
    session: &mut Session,
    shift: &ShiftArgs,
    err: &mut dyn Write,
) -> Result<()> {
    let defaults = SnapshotForm::from_snapshot(session.inputs());
    session.apply_form(&shift.to_form(&defaults));

    for raw in &shift.incomes {
        match parse_labeled_amount(raw) {
            Ok((label, amount)) => {
                if let Err(e) = session.add_extra_income(&label, amount) {
                    writeln!(err, "Rejected income '{raw}': {e}")?;
                }
            }
            Err(e) => writeln!(err, "Rejected income: {e}")?,
        }
    }
    for raw in &shift.expenses {
        match parse_labeled_amount(raw) {
            Ok((label, amount)) => {
                if let Err(e) = session.add_adhoc_expense(&label, amount) {
                    writeln!(err, "Rejected expense '{raw}': {e}")?;
                }
            }
            Err(e) => writeln!(err, "Rejected expense: {e}")?,
        }
    }
    Ok(())
}

/// Runs one command. Reports go to `out`; notices about rejected input and
/// unavailable storage go to `err`.
pub async fn run(
    cli: Cli,
    config: &AppConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let mut db_config = config.db_config();
    if let Some(db) = &cli.db {
        db_config.connection_string = db.clone();
    }

    let registry = build_registry();
    let store = open_store(&registry, &db_config).await;
    if store.is_none() {
        writeln!(
            err,
            "Notice: storage unavailable ({}); results will not be saved.",
            db_config.connection_string
        )?;
    }

    let history_limit = config.history.limit;
    debug!(command = ?cli.command, "Running command");

    match cli.command {
        Command::Calc(shift) => {
            let mut session = Session::with_vehicle_defaults(store).await;
            apply_shift(&mut session, &shift, err)?;
            write!(out, "{}", report::render_metrics(session.inputs(), &session.view()))?;
        }
        Command::Save { shift, date } => {
            let mut session = Session::with_vehicle_defaults(store).await;
            apply_shift(&mut session, &shift, err)?;
            write!(out, "{}", report::render_metrics(session.inputs(), &session.view()))?;

            let saved = match date {
                Some(date) => session.save_for(date).await,
                None => session.save_today().await,
            };
            let record = saved.context("Could not save the record")?;
            writeln!(out, "Saved record for {}.", record.date_key())?;
        }
        Command::Show { date } => {
            let date = date.unwrap_or_else(today);
            let session = Session::new(store);
            match session.get_record(date).await? {
                Some(record) => write!(out, "{}", report::render_record(&record))?,
                None => writeln!(out, "No record saved for {date}.")?,
            }
        }
        Command::History { limit } => {
            let session = Session::new(store);
            let records = session.list_history(limit.unwrap_or(history_limit)).await?;
            write!(out, "{}", report::render_history(&records))?;
        }
        Command::Stats { limit } => {
            let session = Session::new(store);
            let stats = session.show_statistics(limit.unwrap_or(history_limit)).await?;
            write!(out, "{}", report::render_statistics(&stats))?;
        }
        Command::Summary { period, date } => {
            let session = Session::with_vehicle_defaults(store).await;
            let summary = session
                .period_summary(period.into(), date.unwrap_or_else(today))
                .await?;
            write!(out, "{}", report::render_period(&summary))?;
        }
        Command::Delete { date, yes } => {
            if !yes {
                bail!("Refusing to delete the record for {date} without --yes");
            }
            let session = Session::new(store);
            session.delete_record(date).await?;
            writeln!(out, "Deleted record for {date}.")?;
        }
        Command::Vehicle { action } => {
            let mut session = Session::new(store);
            let config = match action {
                VehicleAction::Show => session.vehicle_config().await?,
                VehicleAction::Set {
                    mpg,
                    gas_price,
                    goal,
                } => {
                    let mut config = session.vehicle_config().await?;
                    if let Some(mpg) = mpg {
                        config.fuel_economy = mpg;
                    }
                    if let Some(gas_price) = gas_price {
                        config.fuel_price = gas_price;
                    }
                    if let Some(goal) = goal {
                        config.daily_goal = goal;
                    }
                    session.update_vehicle_config(config).await?
                }
            };
            write!(out, "{}", report::render_vehicle(&config))?;
        }
    }

    Ok(())
}
