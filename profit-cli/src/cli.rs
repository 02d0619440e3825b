use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use profit_core::DATE_FORMAT;
use profit_core::calculations::Period;
use profit_core::input::{SnapshotForm, parse_decimal};
use rust_decimal::Decimal;

/// Daily profit calculator for rideshare and delivery drivers.
///
/// Works out fuel, expenses and net profit for a shift and keeps one saved
/// record per day in a local database.
#[derive(Debug, Parser)]
#[command(name = "driver-profit", version)]
pub struct Cli {
    /// Settings file (default: ./driver-profit.toml when present).
    #[arg(global = true, long)]
    pub config: Option<PathBuf>,

    /// Database connection string, overriding the settings file.
    /// For SQLite this is a file path or `:memory:`.
    #[arg(global = true, long)]
    pub db: Option<String>,

    /// Log level or filter directive, overriding the settings file.
    #[arg(global = true, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate a shift without saving it
    Calc(ShiftArgs),

    /// Calculate a shift and save it as the record for a date
    Save {
        #[command(flatten)]
        shift: ShiftArgs,

        /// Date to save under (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Show the saved record for a date
    Show {
        /// YYYY-MM-DD, default: today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List the most recent saved records
    History {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Totals and averages over the most recent saved records
    Stats {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Summarize a calendar week or month against the daily goal
    Summary {
        #[arg(value_enum)]
        period: PeriodArg,

        /// Any date inside the period (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Delete the saved record for a date
    Delete {
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show or change the vehicle defaults
    Vehicle {
        #[command(subcommand)]
        action: VehicleAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum VehicleAction {
    Show,
    Set {
        /// Fuel economy in miles per gallon
        #[arg(long, value_parser = parse_decimal_arg)]
        mpg: Option<Decimal>,

        /// Gas price per gallon
        #[arg(long, value_parser = parse_decimal_arg)]
        gas_price: Option<Decimal>,

        /// Daily net-profit goal, 0 for none
        #[arg(long, value_parser = parse_decimal_arg)]
        goal: Option<Decimal>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    Week,
    Month,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
        }
    }
}

/// The calculator fields. Numeric fields are read leniently: anything
/// unreadable counts as 0.
#[derive(Debug, Clone, Default, Args)]
pub struct ShiftArgs {
    /// Fuel economy in mpg (default: vehicle setting)
    #[arg(long)]
    pub mpg: Option<String>,

    /// Gas price per gallon (default: vehicle setting)
    #[arg(long)]
    pub gas_price: Option<String>,

    /// Daily net-profit goal (default: vehicle setting)
    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub uber: Option<String>,

    #[arg(long)]
    pub lyft: Option<String>,

    /// Cash tips
    #[arg(long)]
    pub tips: Option<String>,

    /// Odometer at the start of the shift
    #[arg(long)]
    pub odo_start: Option<String>,

    /// Odometer at the end of the shift
    #[arg(long)]
    pub odo_end: Option<String>,

    #[arg(long)]
    pub food: Option<String>,

    #[arg(long)]
    pub misc: Option<String>,

    /// Ad-hoc expense as LABEL=AMOUNT (repeatable)
    #[arg(long = "expense", value_name = "LABEL=AMOUNT")]
    pub expenses: Vec<String>,

    /// Extra income as LABEL=AMOUNT (repeatable)
    #[arg(long = "income", value_name = "LABEL=AMOUNT")]
    pub incomes: Vec<String>,
}

impl ShiftArgs {
    /// Builds the text form, falling back to `defaults` for the vehicle fields.
    pub fn to_form(
        &self,
        defaults: &SnapshotForm,
    ) -> SnapshotForm {
        SnapshotForm {
            fuel_economy: self.mpg.clone().unwrap_or_else(|| defaults.fuel_economy.clone()),
            fuel_price: self
                .gas_price
                .clone()
                .unwrap_or_else(|| defaults.fuel_price.clone()),
            daily_goal: self.goal.clone().unwrap_or_else(|| defaults.daily_goal.clone()),
            uber_earnings: self.uber.clone().unwrap_or_default(),
            lyft_earnings: self.lyft.clone().unwrap_or_default(),
            cash_tips: self.tips.clone().unwrap_or_default(),
            odometer_start: self.odo_start.clone().unwrap_or_default(),
            odometer_end: self.odo_end.clone().unwrap_or_default(),
            food_cost: self.food.clone().unwrap_or_default(),
            misc_cost: self.misc.clone().unwrap_or_default(),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{s}': {e}"))
}

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

/// Splits `LABEL=AMOUNT` at the last `=`. The amount must be a number.
pub fn parse_labeled_amount(s: &str) -> Result<(String, Decimal), String> {
    let (label, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=AMOUNT, got '{s}'"))?;
    let amount = parse_decimal(amount).map_err(|e| e.to_string())?;
    Ok((label.to_string(), amount))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn save_parses_shift_and_date() {
        let cli = Cli::try_parse_from([
            "driver-profit",
            "--db",
            ":memory:",
            "save",
            "--uber",
            "120",
            "--expense",
            "Tolls=4.50",
            "--expense",
            "Car wash=12",
            "--date",
            "2025-03-01",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        match cli.command {
            Command::Save { shift, date } => {
                assert_eq!(shift.uber.as_deref(), Some("120"));
                assert_eq!(shift.expenses, vec!["Tolls=4.50", "Car wash=12"]);
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1));
            }
            other => panic!("expected save, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["driver-profit", "show", "--date", "03/01/2025"]).is_err());
    }

    #[test]
    fn delete_requires_date() {
        assert!(Cli::try_parse_from(["driver-profit", "delete", "--yes"]).is_err());
    }

    #[test]
    fn to_form_falls_back_to_vehicle_defaults() {
        let defaults = SnapshotForm {
            fuel_economy: "35.0".into(),
            fuel_price: "3.10".into(),
            daily_goal: "200.00".into(),
            ..Default::default()
        };
        let args = ShiftArgs {
            gas_price: Some("3.45".into()),
            uber: Some("80".into()),
            ..Default::default()
        };

        let form = args.to_form(&defaults);

        assert_eq!(form.fuel_economy, "35.0");
        assert_eq!(form.fuel_price, "3.45");
        assert_eq!(form.uber_earnings, "80");
        assert_eq!(form.food_cost, "");
    }

    #[test]
    fn labeled_amount_splits_at_last_equals() {
        assert_eq!(
            parse_labeled_amount("a=b=7.25"),
            Ok(("a=b".to_string(), dec!(7.25)))
        );
        assert!(parse_labeled_amount("Tolls").is_err());
        assert!(parse_labeled_amount("Tolls=abc").is_err());
    }
}
