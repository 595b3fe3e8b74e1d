//! orderlens: split customer orders into spending tiers and chart spending statistics
//!
//! This is the main entrypoint that sets up logging, turns the command line
//! into a run configuration and prints the report.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use orderlens::{run_analysis, viz, Args};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter());

    let config = args.to_config()?;
    if args.verbose {
        println!("orderlens - customer spending tiers");
        println!("===================================\n");
        println!("Input file: {}", config.input.display());
        println!("Threshold: {}", config.threshold);
    }

    let start_time = Instant::now();
    let outcome = run_analysis(&config)?;

    if args.verbose {
        println!("\nOrders:\n{}", outcome.table);
    }
    viz::print_summary(config.threshold, &outcome.tiers, &outcome.summary);

    if !outcome.charts.is_empty() {
        println!("\nCharts:");
        for chart in &outcome.charts {
            println!("  {}", chart.display());
        }
    }

    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "analysis complete");
    Ok(())
}
