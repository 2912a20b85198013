//! Safra report binary.
//!
//! Loads a farm dataset directory, runs every analytics engine over it,
//! and prints the result as pretty JSON on stdout. Logs go to stderr so
//! the output can be piped.
//!
//! ```text
//! safra-report --data ./data --config safra-config.yaml --timeout-ms 5000
//! safra-report --data ./data --season <uuid> --from 2024-09-01
//! ```
//!
//! See `safra-report --help` for every flag and its environment fallback.

mod args;
mod dataset;
mod error;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use safra_analytics::config::LoggingConfig;
use safra_analytics::{AnalyticsConfig, ProductivityEngine, analyze_records};
use safra_ledger::{FarmBook, average_prices};
use safra_types::{ConsumableKind, RecordSet};

use crate::args::{ProductivityQuery, ReportArgs};
use crate::error::ReportError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ReportArgs::parse();
    let (config, found) = load_config(&args.config_path)?;
    init_tracing(&config.logging);

    if !found {
        info!(
            path = %args.config_path.display(),
            "Config file not found, using defaults"
        );
    }

    info!(
        data = %args.data_dir.display(),
        timeout_ms = args.timeout_ms,
        query = args.productivity_query().is_some(),
        "Safra report starting"
    );

    let Ok(result) = tokio::time::timeout(args.timeout(), run(&args, config)).await else {
        return Err(ReportError::Timeout {
            millis: args.timeout_ms,
        }
        .into());
    };
    let output = result?;

    println!("{output}");
    info!(bytes = output.len(), "Report written");
    Ok(())
}

/// Load the YAML config, or defaults when the file does not exist.
///
/// The flag tells the caller whether the file was found, so the fallback
/// can be logged once tracing is up.
fn load_config(path: &Path) -> Result<(AnalyticsConfig, bool), ReportError> {
    if path.exists() {
        Ok((AnalyticsConfig::from_file(path)?, true))
    } else {
        Ok((AnalyticsConfig::parse("")?, false))
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the dataset and render the requested report as JSON.
async fn run(args: &ReportArgs, config: AnalyticsConfig) -> Result<String, ReportError> {
    let records = dataset::load_records(&args.data_dir).await?;
    let query = args.productivity_query();
    tokio::task::spawn_blocking(move || render(records, &config, query.as_ref())).await?
}

fn render(
    records: RecordSet,
    config: &AnalyticsConfig,
    query: Option<&ProductivityQuery>,
) -> Result<String, ReportError> {
    let Some(query) = query else {
        let report = analyze_records(records, config)?;
        return Ok(serde_json::to_string_pretty(&report)?);
    };

    let book = FarmBook::from_records(records)?;
    let prices = average_prices(book.movements(), &config.pricing.window())?;
    let fuel_price = prices
        .get(&ConsumableKind::Fuel)
        .copied()
        .unwrap_or_default();
    let engine = ProductivityEngine::new(&book, fuel_price);

    let filter = query.filter();
    let area = engine.worked_area(&filter.apply(book.operations()))?;
    let report = engine.query(query.subject(), &filter, Some(area))?.report();
    Ok(serde_json::to_string_pretty(&report)?)
}
