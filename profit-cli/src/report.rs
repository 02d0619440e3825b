//! Plain-text rendering of calculator output.

use std::fmt::Write;

use profit_core::calculations::{PeriodSummary, Statistics};
use profit_core::display::{MetricsView, format_currency, format_distance, format_percent};
use profit_core::{DailyRecord, DriverInputSnapshot, LineItems, VehicleConfig};

fn line(
    out: &mut String,
    label: &str,
    value: &str,
) {
    let _ = writeln!(out, "  {label:<18} {value}");
}

fn items(
    out: &mut String,
    title: &str,
    entries: &LineItems,
) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}");
    for (index, item) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{index}] {:<20} {}",
            item.label,
            format_currency(item.amount)
        );
    }
}

/// The full calculator panel for one snapshot.
pub fn render_metrics(
    inputs: &DriverInputSnapshot,
    view: &MetricsView,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Income");
    line(&mut out, "Gross income", &view.gross_income);
    if !inputs.extra_income.is_empty() {
        line(&mut out, "Extra income", &view.extra_income);
    }

    let _ = writeln!(out, "Driving");
    line(&mut out, "Miles driven", &view.miles_driven);
    line(&mut out, "Fuel used", &view.fuel_volume);
    line(&mut out, "Fuel cost", &view.fuel_cost);
    line(&mut out, "Wear and tear", &view.wear_and_tear);
    if view.show_odometer_warning {
        let _ = writeln!(
            out,
            "  ! Odometer start is 0: enter the starting reading to count miles."
        );
    }

    let _ = writeln!(out, "Expenses");
    line(&mut out, "Ad-hoc expenses", &view.adhoc_total);
    line(&mut out, "Total expenses", &view.total_expenses);
    line(&mut out, "Expense ratio", &view.expense_ratio);

    let _ = writeln!(out, "Result");
    line(&mut out, "Net profit", &view.net_profit);
    line(&mut out, "Goal delta", &view.goal_delta);
    if let Some(progress) = &view.goal_progress {
        line(
            &mut out,
            "Goal progress",
            &format!("{progress} of {}", format_currency(inputs.daily_goal)),
        );
    }
    if let Some((_, message)) = &view.health {
        let _ = writeln!(out, "  {message}");
    }
    if view.show_goal_reached {
        let _ = writeln!(out, "  Goal reached!");
    }

    items(&mut out, "Extra income entries", &inputs.extra_income);
    items(&mut out, "Ad-hoc expense entries", &inputs.adhoc_expenses);
    out
}

/// One saved day, header plus the calculator panel.
pub fn render_record(record: &DailyRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (saved {})",
        record.date_key(),
        record.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    out.push_str(&render_metrics(
        &record.inputs,
        &MetricsView::new(&record.metrics),
    ));
    out
}

/// One row per record, most recent first as given.
pub fn render_history(records: &[DailyRecord]) -> String {
    if records.is_empty() {
        return "No saved records.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>12}  {:>12}  {:>12}  {:>10}  {:>7}",
        "Date", "Gross", "Expenses", "Net", "Miles", "Ratio"
    );
    for record in records {
        let m = &record.metrics;
        let _ = writeln!(
            out,
            "{:<10}  {:>12}  {:>12}  {:>12}  {:>10}  {:>7}",
            record.date_key(),
            format_currency(m.gross_income),
            format_currency(m.total_expenses),
            format_currency(m.net_profit),
            format_distance(m.miles_driven),
            format_percent(m.expense_ratio),
        );
    }
    out
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics over {} day(s)", stats.count);
    line(&mut out, "Total income", &format_currency(stats.total_income));
    line(&mut out, "Total expenses", &format_currency(stats.total_expenses));
    line(&mut out, "Total profit", &format_currency(stats.total_profit));
    line(
        &mut out,
        "Average per day",
        &format_currency(stats.average_daily_profit),
    );
    line(&mut out, "Total miles", &format_distance(stats.total_miles));
    line(&mut out, "Total fuel cost", &format_currency(stats.total_fuel_cost));
    out
}

pub fn render_period(summary: &PeriodSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} to {} ({} of {} days recorded)",
        capitalize(summary.period.as_str()),
        summary.start,
        summary.end,
        summary.statistics.count,
        summary.days_in_period
    );
    out.push_str(&render_statistics(&summary.statistics));
    line(&mut out, "Period goal", &format_currency(summary.period_goal));
    line(&mut out, "Goal delta", &format_currency(summary.goal_delta));
    line(&mut out, "Goal progress", &format_percent(summary.goal_percent));
    out
}

pub fn render_vehicle(config: &VehicleConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Vehicle defaults");
    line(&mut out, "Fuel economy", &format!("{} mpg", config.fuel_economy));
    line(&mut out, "Gas price", &format!("{}/gal", format_currency(config.fuel_price)));
    line(&mut out, "Daily goal", &format_currency(config.daily_goal));
    if let Some(updated_at) = config.updated_at {
        line(
            &mut out,
            "Updated",
            &updated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        );
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use profit_core::calculations::{Period, aggregate, compute_metrics, summarize_period};
    use rust_decimal_macros::dec;

    use super::*;

    fn good_day() -> DriverInputSnapshot {
        let mut inputs = DriverInputSnapshot {
            fuel_economy: dec!(30),
            fuel_price: dec!(3),
            daily_goal: dec!(200),
            uber_earnings: dec!(250),
            odometer_start: 1000,
            odometer_end: 1150,
            ..Default::default()
        };
        inputs.adhoc_expenses.add("Car wash", dec!(10)).unwrap();
        inputs
    }

    #[test]
    fn metrics_panel_shows_figures_and_panels() {
        let inputs = good_day();
        let text = render_metrics(&inputs, &MetricsView::new(&compute_metrics(&inputs)));

        assert!(text.contains("Net profit         $225.00"), "{text}");
        assert!(text.contains("150.0 mi"));
        assert!(text.contains("Goal reached!"));
        assert!(text.contains("HEALTHY"));
        assert!(text.contains("[0] Car wash"));
        assert!(!text.contains("Odometer start is 0"));
    }

    #[test]
    fn metrics_panel_warns_about_missing_start_reading() {
        let inputs = DriverInputSnapshot {
            odometer_end: 150,
            ..Default::default()
        };
        let text = render_metrics(&inputs, &MetricsView::new(&compute_metrics(&inputs)));

        assert!(text.contains("Odometer start is 0"));
        assert!(!text.contains("Goal progress"));
        assert!(!text.contains("Goal reached!"));
    }

    #[test]
    fn history_lists_rows_in_given_order() {
        let at = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        let records = vec![
            DailyRecord::new(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(), good_day(), at),
            DailyRecord::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), good_day(), at),
        ];

        let text = render_history(&records);
        let first = text.find("2025-03-02").unwrap();
        let second = text.find("2025-03-01").unwrap();

        assert!(first < second);
        assert_eq!(render_history(&[]), "No saved records.\n");
    }

    #[test]
    fn period_header_names_bounds() {
        let records: Vec<DailyRecord> = Vec::new();
        let anchor = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let summary = summarize_period(Period::Week, anchor, &records, dec!(100));

        let text = render_period(&summary);

        assert!(text.starts_with("Week 2025-03-10 to 2025-03-16 (0 of 7 days recorded)"));
        assert!(text.contains("$700.00"));
        assert_eq!(aggregate(&records).count, 0);
    }
}
