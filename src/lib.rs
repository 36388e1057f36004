pub mod config;
pub mod core;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod indicators;
pub mod models;
pub mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, Granularity, OutputArgs, OutputFormat, SourceArgs};
use crate::core::comparison::Comparison;
use crate::core::orchestrator::load_all;
use crate::core::period::{CalendarDay, CalendarMonth, Period};
use crate::fetcher::{CsvFileSource, HttpCsvSource, RowSource};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "rates_compare_lib=info,rates_compare=info,check_sources=info";

/// Install the fmt subscriber. Call once, from a binary.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// HTTP when a base URL is configured, the local data directory otherwise.
pub fn row_source(cfg: &AppConfig) -> Result<Arc<dyn RowSource>> {
    match &cfg.base_url {
        Some(url) => {
            tracing::info!(base_url = %url, "reading sources over HTTP");
            Ok(Arc::new(HttpCsvSource::new(url)?))
        }
        None => {
            tracing::info!(data_dir = %cfg.data_dir.display(), "reading sources from disk");
            Ok(Arc::new(CsvFileSource::new(cfg.data_dir.clone())))
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rates-compare")]
#[command(about = "Align interest-rate, inflation and FX series onto one timeline")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

/// Entry point of the `rates-compare` binary.
pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.source, &cli.output).context("failed to load configuration")?;
    let source = row_source(&cfg)?;

    let text = match cfg.granularity {
        Granularity::Month => render::<CalendarMonth>(&cfg, source).await?,
        Granularity::Day => render::<CalendarDay>(&cfg, source).await?,
    };
    println!("{}", text);
    Ok(())
}

async fn render<P: Period>(cfg: &AppConfig, source: Arc<dyn RowSource>) -> Result<String> {
    let outcome = load_all::<P>(source, &cfg.profiles).await;
    let comparison = Comparison::new(outcome.registry);
    let chart = comparison.chart(&cfg.selection)?;

    Ok(match cfg.format {
        OutputFormat::Json => report::to_json(&chart)?,
        OutputFormat::Table => report::format_table(&chart, cfg.decimals),
    })
}
