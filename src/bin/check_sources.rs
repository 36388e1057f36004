use anyhow::{Context, Result};
use clap::Parser;

use rates_compare_lib::config::{AppConfig, OutputArgs, SourceArgs};
use rates_compare_lib::core::orchestrator::load_all;
use rates_compare_lib::core::period::CalendarMonth;
use rates_compare_lib::{init_tracing, row_source};

/// Per-source diagnostic: what was read, what was skipped and why, where the
/// fallback scan fired, and which series came out.
#[derive(Parser, Debug)]
#[command(name = "check_sources")]
struct Args {
    #[command(flatten)]
    source: SourceArgs,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let cfg = AppConfig::load(&args.source, &OutputArgs::default()).context("failed to load configuration")?;
    let source = row_source(&cfg)?;

    let outcome = load_all::<CalendarMonth>(source, &cfg.profiles).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.sources)?);
        return Ok(());
    }

    println!("{:<18} | {:>6} | {:>6} | {:>7} | {:>8} | {:>9}", "Source", "Read", "Used", "Skipped", "Fallback", "Ambiguous");
    println!("{}", "-".repeat(70));
    for src in &outcome.sources {
        let ex = &src.extraction;
        println!(
            "{:<18} | {:>6} | {:>6} | {:>7} | {:>8} | {:>9}",
            src.source_id,
            ex.rows_read,
            ex.rows_used,
            ex.rows_skipped(),
            ex.fallback_hits.len(),
            ex.ambiguous_rows.len()
        );
        for err in &src.load_errors {
            println!("    ! {}", err);
        }
        for (reason, count) in &ex.skipped {
            println!("    skipped {:?}: {}", reason, count);
        }
        for hit in &ex.fallback_hits {
            println!("    fallback row {} -> {} = {} (from '{}')", hit.row, hit.label, hit.value, hit.field);
        }
        for s in &src.registered {
            let span = match (&s.first, &s.last) {
                (Some(first), Some(last)) => format!("{} .. {}", first, last),
                _ => "-".to_string(),
            };
            let merged = if s.added < s.periods {
                format!("  ({} new)", s.added)
            } else {
                String::new()
            };
            println!("    {:<28} {:>4} periods  {}{}", s.label, s.periods, span, merged);
        }
    }
    Ok(())
}
