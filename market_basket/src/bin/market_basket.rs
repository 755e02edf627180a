//! # market_basket
//!
//! Prints association rules between services as a JSON list on stdout.

use clap::Parser;
use market_basket::{mine_rules, AprioriConfig, BasketError, Result, Transactions};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DATABASE_PATH_ENV: &str = "TOURISM_DB_PATH";

#[derive(Parser, Debug)]
#[command(name = "market_basket")]
#[command(about = "Association rules between tour services", long_about = None)]
struct Cli {
    /// CSV file with sale_id,service_name rows
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// SQLite database with sales_services and services [env: TOURISM_DB_PATH]
    #[arg(long)]
    database: Option<PathBuf>,

    /// Minimum support threshold
    #[arg(long, default_value_t = 0.01)]
    min_support: f64,

    /// Minimum confidence threshold
    #[arg(long, default_value_t = 0.3)]
    min_confidence: f64,

    /// Minimum lift threshold
    #[arg(long, default_value_t = 1.0)]
    min_lift: f64,

    /// Number of rules to keep
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn run(cli: Cli) -> Result<()> {
    let config = AprioriConfig {
        min_support: cli.min_support,
        min_confidence: cli.min_confidence,
        min_lift: cli.min_lift,
        max_rules: cli.top,
        ..AprioriConfig::default()
    };
    config.validate()?;

    let database = cli
        .database
        .or_else(|| std::env::var_os(DATABASE_PATH_ENV).map(PathBuf::from));
    let transactions = match (&cli.csv_file, &database) {
        (Some(path), _) => Transactions::from_csv(path)?,
        (None, Some(path)) => Transactions::from_database(path)?,
        (None, None) => {
            return Err(BasketError::InvalidParameter(format!(
                "no transaction source: pass --csv-file or --database, or set {}",
                DATABASE_PATH_ENV
            )))
        }
    };

    let rules = mine_rules(&transactions, &config)?;

    let mut buffer = Vec::new();
    if cli.pretty {
        serde_json::to_writer_pretty(&mut buffer, &rules)?;
    } else {
        serde_json::to_writer(&mut buffer, &rules)?;
    }
    buffer.push(b'\n');

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
                .unwrap_or_else(|_| "market_basket=info".into()),
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
