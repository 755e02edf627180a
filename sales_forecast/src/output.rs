//! Rendering of forecast lists

use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Column order of CSV output, matching the JSON field names
pub const CSV_HEADER: [&str; 6] = [
    "date",
    "predicted_sales",
    "predicted_bookings",
    "confidence_lower",
    "confidence_upper",
    "accuracy_score",
];

/// Serialisation format of the forecast list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown output format '{}', expected json or csv",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Csv => f.write_str("csv"),
        }
    }
}

/// Write `points` to `writer`. An empty list renders as `[]` or a bare header.
pub fn write_forecast<W: Write>(
    mut writer: W,
    points: &[ForecastPoint],
    format: OutputFormat,
    pretty: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut writer, points)?;
            } else {
                serde_json::to_writer(&mut writer, points)?;
            }
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut writer);
            csv_writer.write_record(CSV_HEADER)?;
            for point in points {
                csv_writer.serialize(point)?;
            }
            csv_writer.flush()?;
        }
    }
    Ok(())
}
