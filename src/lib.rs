//! orderlens: spending tiers and descriptive statistics for customer orders
//!
//! Loads an orders CSV into an [`OrderTable`], enriches it with a country
//! column, splits it around a spending threshold and answers a fixed set of
//! spending questions, each paired with a chart.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod stats;
pub mod viz;

pub use cli::Args;
pub use config::{AnalysisConfig, ChartStyle};
pub use data::{OrderTable, SpendingTiers};
pub use error::TableError;
pub use pipeline::{run_analysis, AnalysisOutcome};
pub use stats::{summarize, MonthTotal, SpendSummary};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
