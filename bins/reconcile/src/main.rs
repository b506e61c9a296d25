//! Keel reconciliation CLI
//!
//! Reads a JSON snapshot of bookings, orders, expenses and payments and prints
//! the reconciliation report as JSON.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use keel_core::{DateRange, ReconciliationEngine};
use keel_shared::types::PercentPrecision;
use keel_shared::{AppConfig, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "keel", version, about = "Financial reconciliation of booking snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile one snapshot and print the report
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args, Debug)]
struct ReconcileArgs {
    /// Snapshot file (stdin when omitted)
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Earlier snapshot to compare totals against
    #[arg(long, value_name = "FILE")]
    previous: Option<PathBuf>,

    /// First day of the reporting window (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// End of the reporting window, exclusive (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,

    /// Display locale, overrides configuration
    #[arg(long)]
    locale: Option<String>,

    /// Display currency, overrides configuration
    #[arg(long)]
    currency: Option<String>,

    /// Percentage digits, overrides configuration
    #[arg(long, value_enum)]
    precision: Option<Precision>,

    /// Fold on a single thread
    #[arg(long)]
    sequential: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Precision {
    Dashboard,
    Report,
}

impl From<Precision> for PercentPrecision {
    fn from(precision: Precision) -> Self {
        match precision {
            Precision::Dashboard => Self::Dashboard,
            Precision::Report => Self::Report,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let cli = Cli::parse();
    match cli.command {
        Command::Reconcile(args) => reconcile(&config, args),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    // Reports go to stdout, so logs stay on stderr.
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn reconcile(config: &AppConfig, args: ReconcileArgs) -> anyhow::Result<()> {
    let mut settings = config.reconciliation.clone();
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }
    if let Some(currency) = args.currency {
        settings.currency = currency;
    }
    if let Some(precision) = args.precision {
        settings.percent_precision = precision.into();
    }
    if args.sequential {
        settings.parallel = false;
    }
    let engine = ReconciliationEngine::from_settings(&settings)?;

    let range = match (args.start, args.end) {
        (Some(start), Some(end)) if start > end => {
            bail!("--start {start} is after --end {end}")
        }
        (Some(start), Some(end)) => Some(DateRange::from_dates(start, end)),
        _ => None,
    };

    let report = engine.reconcile_value(read_snapshot(args.input.as_deref())?, range)?;

    let output = match args.previous {
        Some(path) => {
            let previous = engine.reconcile_value(read_snapshot(Some(&path))?, range)?;
            let comparison = report.compare_with(&previous, settings.percent_precision);
            json!({ "report": report, "comparison": comparison })
        }
        None => serde_json::to_value(&report)?,
    };

    let mut stdout = io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut stdout, &output)?;
    } else {
        serde_json::to_writer(&mut stdout, &output)?;
    }
    writeln!(stdout)?;

    info!(
        bookings = report.bookings.len(),
        revenue = %report.display.revenue,
        "report written"
    );
    Ok(())
}

fn read_snapshot(path: Option<&Path>) -> anyhow::Result<Value> {
    let mut text = String::new();
    match path {
        Some(path) => {
            BufReader::new(
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
            )
            .read_to_string(&mut text)?;
        }
        None => {
            io::stdin().read_to_string(&mut text)?;
        }
    }
    serde_json::from_str(&text).context("snapshot is not valid JSON")
}
