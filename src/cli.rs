//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    default_countries, parse_hex_color, AnalysisConfig, ChartStyle, DEFAULT_BASE_COLOR,
    DEFAULT_HIGHLIGHT_COLOR,
};

/// Split customer orders into spending tiers and chart basic spending statistics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input orders CSV file
    #[arg(short, long, default_value = "data/orders.csv")]
    pub input: String,

    /// Country for each order, in file order; defaults to the bundled dataset's countries
    /// Example: --countries GBR,AUS,USA
    #[arg(short, long, value_delimiter = ',')]
    pub countries: Option<Vec<String>>,

    /// Do not add the country column
    #[arg(long, conflicts_with = "countries")]
    pub no_enrich: bool,

    /// Name of the enrichment column holding the countries
    #[arg(long, default_value = "country")]
    pub country_column: String,

    /// Orders at or above this amount count as high spending
    #[arg(short, long, default_value = "900", allow_negative_numbers = true)]
    pub threshold: i64,

    /// Directory the charts are written to
    #[arg(short, long, default_value = "charts")]
    pub output_dir: String,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Render charts without any text (no system fonts needed)
    #[arg(long)]
    pub no_labels: bool,

    /// Bar colour for ordinary orders
    #[arg(long, default_value = DEFAULT_BASE_COLOR)]
    pub base_color: String,

    /// Colour for highlighted bars and reference lines
    #[arg(long, default_value = DEFAULT_HIGHLIGHT_COLOR)]
    pub highlight_color: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the run configuration, validating colours along the way
    pub fn to_config(&self) -> crate::Result<AnalysisConfig> {
        let style = ChartStyle {
            base: parse_hex_color(&self.base_color)?,
            highlight: parse_hex_color(&self.highlight_color)?,
            labels: !self.no_labels,
            ..ChartStyle::default()
        };

        let countries = match &self.countries {
            _ if self.no_enrich => None,
            Some(values) => Some(values.iter().map(|value| value.trim().to_string()).collect()),
            None => Some(default_countries()),
        };

        Ok(AnalysisConfig {
            input: PathBuf::from(&self.input),
            countries,
            country_column: self.country_column.clone(),
            threshold: self.threshold,
            output_dir: (!self.no_charts).then(|| PathBuf::from(&self.output_dir)),
            style,
        })
    }

    /// Log filter, raised to debug in verbose mode
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::style::RGBColor;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["orderlens"]);
        let config = args.to_config().unwrap();

        assert_eq!(config.input, PathBuf::from("data/orders.csv"));
        assert_eq!(config.threshold, 900);
        assert_eq!(config.countries, Some(default_countries()));
        assert_eq!(config.output_dir, Some(PathBuf::from("charts")));
        assert_eq!(config.style, ChartStyle::default());
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn test_countries_and_threshold() {
        let args = Args::parse_from([
            "orderlens",
            "--countries",
            "GBR, AUS,USA",
            "--threshold",
            "750",
            "--no-charts",
            "-v",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(
            config.countries,
            Some(vec!["GBR".to_string(), "AUS".to_string(), "USA".to_string()])
        );
        assert_eq!(config.threshold, 750);
        assert_eq!(config.output_dir, None);
        assert_eq!(args.log_filter(), "debug");
    }

    #[test]
    fn test_no_enrich_and_no_labels() {
        let args = Args::parse_from(["orderlens", "--no-enrich", "--no-labels"]);
        let config = args.to_config().unwrap();

        assert_eq!(config.countries, None);
        assert!(!config.style.labels);
        assert!(Args::try_parse_from(["orderlens", "--no-enrich", "-c", "GBR"]).is_err());
    }

    #[test]
    fn test_custom_and_invalid_colors() {
        let args = Args::parse_from(["orderlens", "--highlight-color", "#ff0000"]);
        assert_eq!(args.to_config().unwrap().style.highlight, RGBColor(255, 0, 0));

        let args = Args::parse_from(["orderlens", "--base-color", "purple"]);
        assert!(args.to_config().is_err());
    }
}
