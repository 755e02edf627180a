use rusqlite::Connection;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

fn forecast(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_forecast"))
        .args(args)
        .env_remove("TOURISM_DB_PATH")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_missing_column_exits_non_zero() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "booking_date,total_amount").unwrap();
    writeln!(file, "2024-01-01,100").unwrap();

    let output = forecast(&["--csv-file", path_arg(file.path()), "--days", "3"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("number_of_travelers"), "stderr: {stderr}");
}

#[test]
fn test_empty_database_prints_empty_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tourism.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE destinations (id INTEGER PRIMARY KEY, category TEXT);
             CREATE TABLE tours (id INTEGER PRIMARY KEY, destination_id INTEGER,
                                 duration_days INTEGER, price REAL);
             CREATE TABLE sales (id INTEGER PRIMARY KEY, tour_id INTEGER, booking_date TEXT,
                                 total_amount REAL, number_of_travelers INTEGER,
                                 booking_status TEXT);",
        )
        .unwrap();

    let output = forecast(&["--database", path_arg(&path), "--model", "ensemble"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn test_csv_forecast_output() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "booking_date,total_amount,number_of_travelers").unwrap();
    for day in 1..=31 {
        writeln!(file, "2024-01-{:02},{},2", day, 1000 + 10 * (day % 7)).unwrap();
    }

    let output = forecast(&[
        "--csv-file",
        path_arg(file.path()),
        "--model",
        "classical",
        "--days",
        "4",
        "--format",
        "csv",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("date,predicted_sales"));
    assert!(lines[1].starts_with("2024-02-01,"));
}

#[test]
fn test_unknown_model_is_rejected() {
    let output = forecast(&["--model", "prophet"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
