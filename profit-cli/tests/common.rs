#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn driver_profit() -> Command {
    cargo_bin_cmd!("driver-profit")
}

/// A fresh database path inside the system temp dir.
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{name}_driver_profit.db"));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Saves a 150 mile shift with $250 of Uber earnings for `date`.
pub fn save_shift(
    db_path: &str,
    date: &str,
) {
    driver_profit()
        .args([
            "--db",
            db_path,
            "save",
            "--date",
            date,
            "--mpg",
            "30",
            "--gas-price",
            "3",
            "--uber",
            "250",
            "--odo-start",
            "1000",
            "--odo-end",
            "1150",
            "--expense",
            "Car wash=10",
        ])
        .assert()
        .success();
}
