//! Load → enrich → split → summarize → chart, run once

use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::data::{OrderTable, SpendingTiers};
use crate::stats::{summarize, SpendSummary};
use crate::viz;

/// Column holding each order's month name
pub const MONTH_COLUMN: &str = "month";

/// Everything produced by one analysis run
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Loaded orders after country and month enrichment
    pub table: OrderTable,
    pub tiers: SpendingTiers,
    pub summary: SpendSummary,
    /// Chart files written, empty when charts are disabled
    pub charts: Vec<PathBuf>,
}

pub fn run_analysis(config: &AnalysisConfig) -> crate::Result<AnalysisOutcome> {
    let table = OrderTable::load(&config.input)
        .with_context(|| format!("loading orders from {}", config.input.display()))?;
    info!(rows = table.height(), "orders loaded");

    let table = match &config.countries {
        Some(countries) => table
            .enrich(&config.country_column, countries)
            .with_context(|| format!("adding `{}` column", config.country_column))?,
        None => table,
    };

    let table = if table.has_column(MONTH_COLUMN) {
        debug!("input already has a month column");
        table
    } else {
        table
            .with_month_column(MONTH_COLUMN)
            .context("adding month column")?
    };

    let tiers = table
        .split_by_threshold(config.threshold)
        .with_context(|| format!("splitting orders at {}", config.threshold))?;
    info!(
        threshold = config.threshold,
        low = tiers.low.height(),
        high = tiers.high.height(),
        "customers split into tiers"
    );

    let summary = summarize(&table).context("computing spending statistics")?;
    debug!(average = ?summary.average, busiest = ?summary.busiest_month, "statistics computed");

    let charts = match &config.output_dir {
        Some(dir) => viz::generate_visualization_report(&table, &summary, &config.style, dir)
            .with_context(|| format!("rendering charts into {}", dir.display()))?,
        None => Vec::new(),
    };

    Ok(AnalysisOutcome {
        table,
        tiers,
        summary,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "customer,amount,date").unwrap();
        writeln!(file, "Alice,500,2023-01-01").unwrap();
        writeln!(file, "Bob,1100,2023-12-05").unwrap();
        writeln!(file, "Cara,950,2023-06-20").unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> AnalysisConfig {
        AnalysisConfig {
            input: file.path().to_path_buf(),
            output_dir: None,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_run_without_charts() {
        let file = create_test_csv();
        let mut config = config_for(&file);
        config.countries = Some(vec!["GBR".into(), "AUS".into(), "USA".into()]);

        let outcome = run_analysis(&config).unwrap();
        assert!(outcome.table.has_column("country"));
        assert!(outcome.tiers.high.has_column("country"));
        assert!(outcome.tiers.high.has_column(MONTH_COLUMN));
        assert_eq!(outcome.tiers.low.height(), 1);
        assert_eq!(outcome.tiers.high.height(), 2);
        assert!(outcome.charts.is_empty());
    }

    #[test]
    fn test_default_config_enriches_bundled_orders() {
        let config = AnalysisConfig {
            input: concat!(env!("CARGO_MANIFEST_DIR"), "/data/orders.csv").into(),
            output_dir: None,
            ..AnalysisConfig::default()
        };

        let outcome = run_analysis(&config).unwrap();
        assert_eq!(
            outcome.table.column_names(),
            vec!["customer", "amount", "date", "country", "month"]
        );
    }

    #[test]
    fn test_country_count_mismatch_is_reported() {
        let file = create_test_csv();
        let mut config = config_for(&file);
        config.countries = Some(vec!["GBR".into()]);

        let err = run_analysis(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TableError>(),
            Some(TableError::LengthMismatch { expected: 3, actual: 1 })
        ));
    }
}
