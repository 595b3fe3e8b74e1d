//! Order table loading, enrichment and threshold splitting using Polars

use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::error::TableError;

pub const CUSTOMER: &str = "customer";
pub const AMOUNT: &str = "amount";
pub const DATE: &str = "date";

/// Columns every orders file must provide
pub const REQUIRED_COLUMNS: [&str; 3] = [CUSTOMER, AMOUNT, DATE];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Result type for table operations
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Customer orders held column-wise, rows kept in file order
#[derive(Debug, Clone)]
pub struct OrderTable {
    frame: DataFrame,
}

/// Orders partitioned around a spending threshold
#[derive(Debug, Clone)]
pub struct SpendingTiers {
    /// Rows with `amount < threshold`
    pub low: OrderTable,
    /// Rows with `amount >= threshold`
    pub high: OrderTable,
}

impl OrderTable {
    /// Load an orders CSV file with a header row
    ///
    /// # Arguments
    /// * `path` - Path to the CSV file
    ///
    /// # Returns
    /// * `OrderTable` with columns taken verbatim from the header
    ///
    /// # Errors
    /// * `ResourceNotFound` when the file does not exist
    /// * `Format` when the file cannot be parsed or lacks a required column
    pub fn load(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TableError::ResourceNotFound(path.to_path_buf()));
        }

        // every column stays text until an accessor coerces it
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| TableError::Format(e.to_string()))?;

        let table = Self { frame };
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| !table.has_column(name))
        {
            return Err(TableError::Format(format!(
                "missing required column `{missing}` in {}",
                path.display()
            )));
        }

        debug!(
            path = %path.display(),
            rows = table.height(),
            columns = table.frame.width(),
            "loaded orders"
        );
        Ok(table)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    fn series(&self, name: &str) -> TableResult<&Series> {
        self.frame
            .column(name)
            .map(|column| column.as_materialized_series())
            .map_err(|_| TableError::MissingColumn(name.to_string()))
    }

    /// Customer identifiers in row order; missing names come back empty
    pub fn customers(&self) -> TableResult<Vec<String>> {
        let series = self.series(CUSTOMER)?.cast(&DataType::String)?;
        let customers = series
            .str()?
            .into_iter()
            .map(|value| value.unwrap_or_default().to_string())
            .collect();
        Ok(customers)
    }

    /// Order amounts coerced to integers
    ///
    /// Whole numbers are taken as-is, decimals are truncated toward zero.
    /// Fails with `TypeCoercion` on the first value that is missing, not
    /// numeric, or outside the `i64` range.
    pub fn amounts(&self) -> TableResult<Vec<i64>> {
        let series = self.series(AMOUNT)?;
        let as_int = series.cast(&DataType::Int64)?;
        let as_float = series.cast(&DataType::Float64)?;

        as_int
            .i64()?
            .into_iter()
            .zip(as_float.f64()?.into_iter())
            .enumerate()
            .map(|(row, (int, float))| {
                int.or_else(|| float.and_then(truncate_to_i64))
                    .ok_or_else(|| TableError::coercion(AMOUNT, row, raw_value(series, row)))
            })
            .collect()
    }

    /// Order dates parsed from the `date` column
    pub fn dates(&self) -> TableResult<Vec<NaiveDate>> {
        let series = self.series(DATE)?.cast(&DataType::String)?;

        series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value
                    .and_then(parse_order_date)
                    .ok_or_else(|| TableError::coercion(DATE, row, value.unwrap_or("null")))
            })
            .collect()
    }

    /// Return a new table with one extra column, `values[i]` landing on row `i`
    ///
    /// The receiver is left untouched.
    ///
    /// # Errors
    /// * `InvalidColumnName` for an empty name
    /// * `DuplicateColumn` when the name is already taken
    /// * `LengthMismatch` when `values` does not have one entry per row
    pub fn enrich<S: AsRef<str>>(
        &self,
        column_name: &str,
        values: &[S],
    ) -> TableResult<Self> {
        if column_name.trim().is_empty() {
            return Err(TableError::InvalidColumnName(column_name.to_string()));
        }
        if self.has_column(column_name) {
            return Err(TableError::DuplicateColumn(column_name.to_string()));
        }
        if values.len() != self.height() {
            return Err(TableError::LengthMismatch {
                expected: self.height(),
                actual: values.len(),
            });
        }

        let values: Vec<&str> = values.iter().map(|value| value.as_ref()).collect();
        let mut frame = self.frame.clone();
        frame.with_column(Series::new(column_name.into(), values))?;

        debug!(column = column_name, "enriched orders");
        Ok(Self { frame })
    }

    /// Enrich with the English month name of each order date
    pub fn with_month_column(&self, column_name: &str) -> TableResult<Self> {
        let months: Vec<String> = self
            .dates()?
            .iter()
            .map(|date| date.format("%B").to_string())
            .collect();
        self.enrich(column_name, &months)
    }

    /// Partition rows into `amount < threshold` and `amount >= threshold`
    ///
    /// Both halves keep the input row order and store `amount` as integers.
    pub fn split_by_threshold(&self, threshold: i64) -> TableResult<SpendingTiers> {
        let amounts = self.amounts()?;

        let mut frame = self.frame.clone();
        frame.with_column(Series::new(AMOUNT.into(), amounts.clone()))?;
        let coerced = Self { frame };

        let below: Vec<bool> = amounts.iter().map(|&amount| amount < threshold).collect();
        let at_or_above: Vec<bool> = below.iter().map(|&low| !low).collect();

        let tiers = SpendingTiers {
            low: coerced.filter_rows(&below)?,
            high: coerced.filter_rows(&at_or_above)?,
        };

        debug!(
            threshold,
            low = tiers.low.height(),
            high = tiers.high.height(),
            "split orders"
        );
        Ok(tiers)
    }

    /// Keep the rows whose mask entry is `true`
    pub(crate) fn filter_rows(&self, keep: &[bool]) -> TableResult<Self> {
        let mask: BooleanChunked = keep.iter().copied().collect();
        Ok(Self {
            frame: self.frame.filter(&mask)?,
        })
    }
}

impl fmt::Display for OrderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}

fn truncate_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // 2^63 itself is out of range, hence the strict upper bound
    (truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64)
        .then_some(truncated as i64)
}

fn raw_value(series: &Series, row: usize) -> String {
    series
        .get(row)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| "null".to_string())
}

/// Parse an order date in one of the accepted calendar formats
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
}
