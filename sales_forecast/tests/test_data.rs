use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rusqlite::Connection;
use sales_forecast::config::CategoryFilter;
use sales_forecast::data::{DataLoader, DataOrigin, DataSource, SYNTHETIC_DAYS};
use sales_forecast::ForecastError;
use std::io::Write;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn booking_db(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("tourism.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE destinations (id INTEGER PRIMARY KEY, name TEXT, category TEXT);
         CREATE TABLE tours (id INTEGER PRIMARY KEY, destination_id INTEGER,
                             duration_days INTEGER, price REAL);
         CREATE TABLE sales (id INTEGER PRIMARY KEY, tour_id INTEGER, booking_date TEXT,
                             total_amount REAL, number_of_travelers INTEGER,
                             booking_status TEXT);
         INSERT INTO destinations VALUES (1, 'Bali', 'beach'), (2, 'Alps', 'mountain');
         INSERT INTO tours VALUES (10, 1, 5, 1200.0), (20, 2, 7, 2500.0);
         INSERT INTO sales VALUES
             (1, 10, '2024-01-02 10:00:00', 2400.0, 2, 'confirmed'),
             (2, 20, '2024-01-01 09:30:00', 5000.0, 2, 'completed'),
             (3, 10, '2024-01-03 12:00:00', 1200.0, 1, 'cancelled'),
             (4, 20, '2024-01-03 08:00:00', 7500.0, 3, 'confirmed');",
    )
    .unwrap();
    path
}

#[test]
fn test_csv_loads_and_sorts() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers,destination_category",
        "2024-01-03,300.5,2,beach",
        "2024-01-01 14:00:00,100,1,mountain",
        "2024-01-02,0,4,beach",
    ]);

    let loaded = DataLoader::new()
        .load(&DataSource::File(file.path().to_path_buf()))
        .unwrap();

    assert_eq!(loaded.origin, DataOrigin::File);
    let dates: Vec<_> = loaded.records.iter().map(|r| r.booking_date).collect();
    assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
    assert_eq!(loaded.records[2].total_amount, 300.5);
    assert_eq!(loaded.records[0].destination_category.as_deref(), Some("mountain"));
}

#[test]
fn test_csv_category_filter() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers,destination_category",
        "2024-01-01,100,1,beach",
        "2024-01-02,200,1,mountain",
    ]);

    let records = DataLoader::new()
        .with_category(CategoryFilter::Destination("Beach".to_string()))
        .from_file(file.path())
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].booking_date, date(2024, 1, 1));
}

#[test]
fn test_destination_filter_ignored_without_category_column() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers",
        "2024-01-01,100,1",
        "2024-01-02,200,2",
        "2024-01-03,300,3",
    ]);

    let unfiltered = DataLoader::new().from_file(file.path()).unwrap();
    let filtered = DataLoader::new()
        .with_category(CategoryFilter::Destination("beach".to_string()))
        .from_file(file.path())
        .unwrap();

    assert_eq!(filtered.len(), 3);
    assert_eq!(filtered, unfiltered);
}

#[test]
fn test_missing_column_is_fatal() {
    let file = csv_file(&["booking_date,total_amount", "2024-01-01,100"]);

    let err = DataLoader::new()
        .load(&DataSource::File(file.path().to_path_buf()))
        .unwrap_err();

    match err {
        ForecastError::MissingColumns(columns) => {
            assert_eq!(columns, vec!["number_of_travelers".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bad_row_reports_row_number() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers",
        "2024-01-01,100,1",
        "someday,100,1",
    ]);

    let err = DataLoader::new().from_file(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::ParseError { row: 2, .. }));
}

#[test]
fn test_negative_amount_is_rejected() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers",
        "2024-01-01,-5,1",
    ]);

    let err = DataLoader::new().from_file(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::ParseError { row: 1, .. }));
}

#[test]
fn test_zero_travelers_is_rejected() {
    let file = csv_file(&[
        "booking_date,total_amount,number_of_travelers",
        "2024-01-01,50,0",
    ]);

    assert!(DataLoader::new().from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_is_fatal() {
    let result = DataLoader::new().load(&DataSource::File("no_such_sales.csv".into()));
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_database_source() {
    let dir = TempDir::new().unwrap();
    let path = booking_db(dir.path());

    let records = DataLoader::from_database(&path, &CategoryFilter::All).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].booking_date, date(2024, 1, 1));
    assert_eq!(records[0].duration_days, Some(7));
    assert_eq!(records[2].total_amount, 7500.0);
}

#[test]
fn test_database_destination_filter() {
    let dir = TempDir::new().unwrap();
    let path = booking_db(dir.path());

    let by_category =
        DataLoader::from_database(&path, &CategoryFilter::Destination("beach".into())).unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].price, Some(1200.0));

    let by_id = DataLoader::from_database(&path, &CategoryFilter::Destination("2".into())).unwrap();
    assert_eq!(by_id.len(), 2);
}

#[test]
fn test_unreachable_database_falls_back_to_synthetic() {
    let dir = TempDir::new().unwrap();
    let source = DataSource::Database {
        path: dir.path().join("missing.db"),
        category: CategoryFilter::All,
    };

    let loaded = DataLoader::new()
        .with_synthetic_end(date(2024, 6, 30))
        .load(&source)
        .unwrap();

    assert_eq!(loaded.origin, DataOrigin::Synthetic);
    assert_eq!(loaded.records.len(), SYNTHETIC_DAYS);
    assert_eq!(loaded.records.last().unwrap().booking_date, date(2024, 6, 30));
}

#[test]
fn test_database_without_tables_falls_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.db");
    Connection::open(&path).unwrap();

    let loaded = DataLoader::new()
        .load(&DataSource::Database {
            path,
            category: CategoryFilter::All,
        })
        .unwrap();
    assert_eq!(loaded.origin, DataOrigin::Synthetic);
}

#[test]
fn test_empty_database_is_not_a_fallback() {
    let dir = TempDir::new().unwrap();
    let path = booking_db(dir.path());
    Connection::open(&path)
        .unwrap()
        .execute("DELETE FROM sales", [])
        .unwrap();

    let loaded = DataLoader::new()
        .load(&DataSource::Database {
            path,
            category: CategoryFilter::All,
        })
        .unwrap();

    assert_eq!(loaded.origin, DataOrigin::Database);
    assert!(loaded.records.is_empty());
}
