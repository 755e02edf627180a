//! # forecast
//!
//! Prints daily sales and booking forecasts as JSON (or CSV) on stdout.
//! Diagnostics go to stderr.

use clap::Parser;
use sales_forecast::config::{CategoryFilter, ForecastConfig, ModelKind, ModelParameters};
use sales_forecast::output::{write_forecast, OutputFormat};
use sales_forecast::pipeline::ForecastPipeline;
use sales_forecast::Result;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "forecast")]
#[command(about = "Tourism sales and bookings forecaster", long_about = None)]
struct Cli {
    /// Model to run (classical, regression, ensemble)
    #[arg(short, long, default_value = "regression")]
    model: ModelKind,

    /// Destination id or category, or "all"
    #[arg(short, long, default_value = "all")]
    destination: CategoryFilter,

    /// Number of days to forecast
    #[arg(long, default_value_t = 30)]
    days: usize,

    /// CSV or Parquet file with transactions (overrides the database)
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// SQLite database with sales, tours and destinations [env: TOURISM_DB_PATH]
    #[arg(long)]
    database: Option<PathBuf>,

    /// JSON file with model parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (json, csv)
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Fit the models concurrently
    #[arg(long)]
    parallel: bool,
}

impl Cli {
    fn into_config(self) -> Result<ForecastConfig> {
        let params = match &self.config {
            Some(path) => ModelParameters::from_json_file(path)?,
            None => ModelParameters::default(),
        };
        let config = ForecastConfig {
            model: self.model,
            category: self.destination,
            horizon: self.days,
            csv_file: self.csv_file,
            database_path: self.database.or(ForecastConfig::from_env().database_path),
            parallel: self.parallel,
            params,
        };
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let format = cli.format;
    let pretty = cli.pretty;
    let config = cli.into_config()?;
    debug!(?config, "parsed configuration");

    let points = ForecastPipeline::new(config).run()?;

    let mut buffer = Vec::new();
    write_forecast(&mut buffer, &points, format, pretty)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&buffer)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info,forecast=info".into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
