//! Transaction loading for forecasting
//!
//! Three sources feed the pipeline: an explicit tabular file, the SQLite
//! booking database, and a seeded synthetic generator. A file that cannot be
//! read or parsed is a fatal input error. A database that cannot be reached
//! or queried degrades to synthetic data so the pipeline stays runnable.

use crate::config::{CategoryFilter, ForecastConfig};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use polars::prelude::{CsvReader, DataFrame, DataType, ParquetReader, SerReader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use rusqlite::{params, Connection, OpenFlags, Row};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Columns every tabular source must provide
pub const REQUIRED_COLUMNS: [&str; 3] = ["booking_date", "total_amount", "number_of_travelers"];

/// Days generated by the synthetic fallback
pub const SYNTHETIC_DAYS: usize = 365;

/// Seed of the synthetic fallback
pub const SYNTHETIC_SEED: u64 = 42;

const SALES_QUERY: &str = "
    SELECT
        s.booking_date,
        s.total_amount,
        s.number_of_travelers,
        t.duration_days,
        t.price,
        d.category
    FROM sales s
    JOIN tours t ON s.tour_id = t.id
    JOIN destinations d ON t.destination_id = d.id
    WHERE s.booking_status IN ('confirmed', 'completed')
      AND (?1 IS NULL OR CAST(d.id AS TEXT) = ?1 OR LOWER(d.category) = LOWER(?1))
    ORDER BY s.booking_date";

/// One booking transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub booking_date: NaiveDate,
    /// Non-negative sale amount
    pub total_amount: f64,
    /// Positive traveler count
    pub number_of_travelers: u32,
    pub destination_category: Option<String>,
    pub duration_days: Option<u32>,
    pub price: Option<f64>,
}

impl TransactionRecord {
    /// Record with only the required fields
    pub fn new(booking_date: NaiveDate, total_amount: f64, number_of_travelers: u32) -> Self {
        Self {
            booking_date,
            total_amount,
            number_of_travelers,
            destination_category: None,
            duration_days: None,
            price: None,
        }
    }
}

/// Where transactions come from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// CSV or Parquet file; failures are fatal
    File(PathBuf),
    /// SQLite booking database; failures fall back to synthetic data
    Database {
        path: PathBuf,
        category: CategoryFilter,
    },
    /// No source configured
    Synthetic,
}

impl DataSource {
    /// Pick the source named by the configuration: file, then database, then synthetic
    pub fn from_config(config: &ForecastConfig) -> Self {
        if let Some(path) = &config.csv_file {
            DataSource::File(path.clone())
        } else if let Some(path) = &config.database_path {
            DataSource::Database {
                path: path.clone(),
                category: config.category.clone(),
            }
        } else {
            DataSource::Synthetic
        }
    }
}

/// Which source actually produced the records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    File,
    Database,
    Synthetic,
}

/// Validated, date-sorted transactions
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: Vec<TransactionRecord>,
    pub origin: DataOrigin,
}

/// Data loader for transaction histories
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Last day of generated data when falling back to synthetic records
    synthetic_end: NaiveDate,
    category: CategoryFilter,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Loader whose synthetic fallback ends today
    pub fn new() -> Self {
        Self {
            synthetic_end: Local::now().date_naive(),
            category: CategoryFilter::All,
        }
    }

    /// Pin the end date of synthetic data
    pub fn with_synthetic_end(mut self, end: NaiveDate) -> Self {
        self.synthetic_end = end;
        self
    }

    /// Filter applied to file rows that carry a destination category
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    /// Load transactions from `source`
    pub fn load(&self, source: &DataSource) -> Result<LoadedData> {
        match source {
            DataSource::File(path) => {
                let records = self.from_file(path)?;
                info!(rows = records.len(), path = %path.display(), "loaded transactions from file");
                Ok(LoadedData {
                    records,
                    origin: DataOrigin::File,
                })
            }
            DataSource::Database { path, category } => match Self::from_database(path, category) {
                Ok(records) => {
                    info!(rows = records.len(), "loaded transactions from database");
                    Ok(LoadedData {
                        records,
                        origin: DataOrigin::Database,
                    })
                }
                Err(err) => {
                    warn!(error = %err, "database unavailable, using synthetic data");
                    Ok(self.synthetic())
                }
            },
            DataSource::Synthetic => {
                debug!("no transaction source configured, using synthetic data");
                Ok(self.synthetic())
            }
        }
    }

    fn synthetic(&self) -> LoadedData {
        LoadedData {
            records: generate_synthetic_data(self.synthetic_end, SYNTHETIC_DAYS, SYNTHETIC_SEED),
            origin: DataOrigin::Synthetic,
        }
    }

    /// Load transactions from a CSV or Parquet file
    pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<TransactionRecord>> {
        let path = path.as_ref();
        if fs::metadata(path)?.len() == 0 {
            return Err(ForecastError::MissingColumns(
                REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            ));
        }

        let file = File::open(path)?;
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"));
        let df = if is_parquet {
            ParquetReader::new(file).finish()?
        } else {
            CsvReader::new(file)
                .infer_schema(None)
                .has_header(true)
                .finish()?
        };

        let mut records = Self::records_from_dataframe(&df)?;
        if category_column(&df).is_none() {
            if self.category != CategoryFilter::All {
                debug!("file has no destination column, destination filter ignored");
            }
            return Ok(records);
        }

        let before = records.len();
        records.retain(|r| self.category.matches(r.destination_category.as_deref()));
        if records.len() != before {
            debug!(kept = records.len(), dropped = before - records.len(), "applied destination filter");
        }
        Ok(records)
    }

    /// Validate a frame and turn it into sorted records
    pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<TransactionRecord>> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !names.iter().any(|n| n == *required))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ForecastError::MissingColumns(missing));
        }

        let dates = text_column(df, "booking_date")?;
        let amounts = numeric_column(df, "total_amount")?;
        let travelers = numeric_column(df, "number_of_travelers")?;

        let categories = match category_column(df) {
            Some(name) => Some(text_column(df, name)?),
            None => None,
        };
        let durations = optional_numeric_column(df, &names, "duration_days")?;
        let prices = optional_numeric_column(df, &names, "price")?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = i + 1;

            let booking_date = dates[i]
                .as_deref()
                .and_then(parse_booking_date)
                .ok_or_else(|| ForecastError::ParseError {
                    row,
                    message: format!("invalid booking_date {:?}", dates[i]),
                })?;
            let total_amount = amounts[i]
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| ForecastError::ParseError {
                    row,
                    message: "total_amount must be a non-negative number".to_string(),
                })?;
            let number_of_travelers = travelers[i]
                .filter(|v| *v >= 1.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u32)
                .ok_or_else(|| ForecastError::ParseError {
                    row,
                    message: "number_of_travelers must be a positive integer".to_string(),
                })?;

            records.push(TransactionRecord {
                booking_date,
                total_amount,
                number_of_travelers,
                destination_category: categories.as_ref().and_then(|c| c[i].clone()),
                duration_days: durations
                    .as_ref()
                    .and_then(|d| d[i])
                    .filter(|v| *v >= 0.0)
                    .map(|v| v as u32),
                price: prices.as_ref().and_then(|p| p[i]),
            });
        }

        records.sort_by_key(|r| r.booking_date);
        Ok(records)
    }

    /// Query confirmed and completed sales from the SQLite booking database
    pub fn from_database<P: AsRef<Path>>(
        path: P,
        category: &CategoryFilter,
    ) -> Result<Vec<TransactionRecord>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForecastError::SourceUnavailable(format!(
                "database {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn.prepare(SALES_QUERY)?;
        let filter = match category {
            CategoryFilter::All => None,
            CategoryFilter::Destination(value) => Some(value.as_str()),
        };
        let rows = stmt
            .query_map(params![filter], read_sales_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (i, raw) in rows.into_iter().enumerate() {
            let booking_date = parse_booking_date(&raw.booking_date).ok_or_else(|| {
                ForecastError::SourceUnavailable(format!(
                    "row {} has unparseable booking_date '{}'",
                    i + 1,
                    raw.booking_date
                ))
            })?;
            if !(raw.total_amount.is_finite() && raw.total_amount >= 0.0) || raw.travelers < 1 {
                return Err(ForecastError::SourceUnavailable(format!(
                    "row {} has invalid amount or traveler count",
                    i + 1
                )));
            }
            records.push(TransactionRecord {
                booking_date,
                total_amount: raw.total_amount,
                number_of_travelers: u32::try_from(raw.travelers).unwrap_or(u32::MAX),
                destination_category: raw.category,
                duration_days: raw.duration_days.and_then(|d| u32::try_from(d).ok()),
                price: raw.price,
            });
        }

        records.sort_by_key(|r| r.booking_date);
        Ok(records)
    }
}

struct SalesRow {
    booking_date: String,
    total_amount: f64,
    travelers: i64,
    duration_days: Option<i64>,
    price: Option<f64>,
    category: Option<String>,
}

fn read_sales_row(row: &Row<'_>) -> rusqlite::Result<SalesRow> {
    Ok(SalesRow {
        booking_date: row.get(0)?,
        total_amount: row.get(1)?,
        travelers: row.get(2)?,
        duration_days: row.get(3)?,
        price: row.get(4)?,
        category: row.get(5)?,
    })
}

/// One record per day ending at `end`, amounts uniform in [5000, 50000),
/// travelers uniform in [1, 10). The same seed always yields the same data.
pub fn generate_synthetic_data(end: NaiveDate, days: usize, seed: u64) -> Vec<TransactionRecord> {
    if days == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let amount_dist = Uniform::new(5000.0, 50000.0);
    let traveler_dist = Uniform::new(1u32, 10u32);

    let amounts: Vec<f64> = (0..days).map(|_| amount_dist.sample(&mut rng)).collect();
    let travelers: Vec<u32> = (0..days).map(|_| traveler_dist.sample(&mut rng)).collect();

    let start = end - Duration::days(days as i64 - 1);
    amounts
        .into_iter()
        .zip(travelers)
        .enumerate()
        .map(|(i, (amount, count))| {
            TransactionRecord::new(start + Duration::days(i as i64), amount, count)
        })
        .collect()
}

/// Parse the date part of the booking timestamps seen in exports
pub fn parse_booking_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Name of the destination column carried by the frame, if any
fn category_column(df: &DataFrame) -> Option<&'static str> {
    let names = df.get_column_names();
    ["destination_category", "destination"]
        .into_iter()
        .find(|name| names.contains(name))
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

fn optional_numeric_column(
    df: &DataFrame,
    names: &[String],
    name: &str,
) -> Result<Option<Vec<Option<f64>>>> {
    if names.iter().any(|n| n == name) {
        numeric_column(df, name).map(Some)
    } else {
        Ok(None)
    }
}
