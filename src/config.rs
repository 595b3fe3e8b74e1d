//! Run configuration: input, enrichment values, tier threshold and chart styling

use std::path::PathBuf;

use anyhow::Context;
use plotters::style::RGBColor;

pub const DEFAULT_BASE_COLOR: &str = "#debbfb";
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#9774e8";

/// Country per order of the bundled `data/orders.csv`
pub const DEFAULT_COUNTRIES: [&str; 8] = ["GBR", "AUS", "USA", "GBR", "RUS", "GBR", "KOR", "NZ"];

/// Colours and canvas size shared by every chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    /// Fill for ordinary bars
    pub base: RGBColor,
    /// Fill for the highlighted bar and the reference line
    pub highlight: RGBColor,
    pub width: u32,
    pub height: u32,
    /// Draw captions, axis labels and legends; without them no font is needed
    pub labels: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            base: RGBColor(0xde, 0xbb, 0xfb),
            highlight: RGBColor(0x97, 0x74, 0xe8),
            width: 900,
            height: 600,
            labels: true,
        }
    }
}

/// Everything a single analysis run needs
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    /// Values for the enrichment column, one per order; `None` skips enrichment
    pub countries: Option<Vec<String>>,
    pub country_column: String,
    /// Orders at or above this amount are high spenders
    pub threshold: i64,
    /// Charts are skipped when `None`
    pub output_dir: Option<PathBuf>,
    pub style: ChartStyle,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/orders.csv"),
            countries: Some(default_countries()),
            country_column: "country".to_string(),
            threshold: 900,
            output_dir: Some(PathBuf::from("charts")),
            style: ChartStyle::default(),
        }
    }
}

pub fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

/// Parse a `#rrggbb` colour string
pub fn parse_hex_color(value: &str) -> crate::Result<RGBColor> {
    let hex = value
        .trim()
        .strip_prefix('#')
        .with_context(|| format!("colour {value:?} must start with '#'"))?;

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("colour {value:?} must be in #rrggbb form");
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("invalid colour channel in {value:?}"))
    };

    Ok(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#debbfb").unwrap(), RGBColor(0xde, 0xbb, 0xfb));
        assert_eq!(parse_hex_color(" #9774E8 ").unwrap(), RGBColor(0x97, 0x74, 0xe8));

        assert!(parse_hex_color("debbfb").is_err());
        assert!(parse_hex_color("#debb").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_default_style_matches_default_colors() {
        let style = ChartStyle::default();
        assert_eq!(style.base, parse_hex_color(DEFAULT_BASE_COLOR).unwrap());
        assert_eq!(style.highlight, parse_hex_color(DEFAULT_HIGHLIGHT_COLOR).unwrap());
    }
}
