//! Descriptive spending statistics over an order table

use chrono::{Datelike, Month, NaiveDate};

use crate::data::{OrderTable, TableResult, AMOUNT};
use crate::error::TableError;

/// Summed order amount for one calendar month, year ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthTotal {
    pub month: Month,
    pub total: i64,
}

impl MonthTotal {
    pub fn name(&self) -> &'static str {
        self.month.name()
    }
}

/// Answers to the fixed set of spending questions
#[derive(Debug, Clone)]
pub struct SpendSummary {
    /// Orders whose amount equals the maximum
    pub highest: OrderTable,
    /// Orders whose amount equals the minimum
    pub lowest: OrderTable,
    /// Mean order amount, `None` for an empty table
    pub average: Option<f64>,
    /// Orders placed on the earliest date
    pub earliest: OrderTable,
    /// Totals per month in calendar order
    pub monthly: Vec<MonthTotal>,
    pub busiest_month: Option<MonthTotal>,
}

/// All orders whose amount equals the table maximum, ties included
pub fn highest_spenders(table: &OrderTable) -> TableResult<OrderTable> {
    let amounts = table.amounts()?;
    match amounts.iter().max() {
        Some(&max) => rows_matching(table, &amounts, max),
        None => Ok(table.clone()),
    }
}

/// All orders whose amount equals the table minimum, ties included
pub fn lowest_spenders(table: &OrderTable) -> TableResult<OrderTable> {
    let amounts = table.amounts()?;
    match amounts.iter().min() {
        Some(&min) => rows_matching(table, &amounts, min),
        None => Ok(table.clone()),
    }
}

fn rows_matching(table: &OrderTable, amounts: &[i64], target: i64) -> TableResult<OrderTable> {
    let keep: Vec<bool> = amounts.iter().map(|&amount| amount == target).collect();
    table.filter_rows(&keep)
}

/// Mean order amount, `None` when there are no orders
///
/// Summed in `i128` so any number of `i64` amounts fits.
pub fn average_amount(table: &OrderTable) -> TableResult<Option<f64>> {
    let amounts = table.amounts()?;
    if amounts.is_empty() {
        return Ok(None);
    }
    let sum: i128 = amounts.iter().map(|&amount| amount as i128).sum();
    Ok(Some(sum as f64 / amounts.len() as f64))
}

/// Orders placed on the earliest date in the table
pub fn earliest_orders(table: &OrderTable) -> TableResult<OrderTable> {
    let dates = table.dates()?;
    match dates.iter().min() {
        Some(&first) => {
            let keep: Vec<bool> = dates.iter().map(|&date| date == first).collect();
            table.filter_rows(&keep)
        }
        None => Ok(table.clone()),
    }
}

/// Sum amounts per calendar month; months without orders are left out
pub fn monthly_totals(table: &OrderTable) -> TableResult<Vec<MonthTotal>> {
    let amounts = table.amounts()?;
    let dates = table.dates()?;
    totals_by_month(&dates, &amounts)
}

fn totals_by_month(dates: &[NaiveDate], amounts: &[i64]) -> TableResult<Vec<MonthTotal>> {
    let mut totals: [Option<i64>; 12] = [None; 12];
    for (date, &amount) in dates.iter().zip(amounts) {
        let slot = &mut totals[date.month0() as usize];
        let total = slot
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| TableError::AmountOverflow(AMOUNT.to_string()))?;
        *slot = Some(total);
    }

    Ok(totals
        .iter()
        .enumerate()
        .filter_map(|(index, total)| {
            let month = Month::try_from(index as u8 + 1).ok()?;
            total.map(|total| MonthTotal { month, total })
        })
        .collect())
}

/// Month with the largest total; ties go to the earlier month
pub fn busiest_month(totals: &[MonthTotal]) -> Option<MonthTotal> {
    totals.iter().copied().fold(None, |best, candidate| match best {
        Some(current) if current.total >= candidate.total => Some(current),
        _ => Some(candidate),
    })
}

/// Compute every statistic in one pass over the table
pub fn summarize(table: &OrderTable) -> TableResult<SpendSummary> {
    let monthly = monthly_totals(table)?;
    let busiest_month = busiest_month(&monthly);

    Ok(SpendSummary {
        highest: highest_spenders(table)?,
        lowest: lowest_spenders(table)?,
        average: average_amount(table)?,
        earliest: earliest_orders(table)?,
        monthly,
        busiest_month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(lines: &[&str]) -> OrderTable {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        OrderTable::load(file.path()).unwrap()
    }

    fn sample_table() -> OrderTable {
        load(&[
            "customer,amount,date",
            "Alice,500,2023-01-01",
            "Bob,1100,2023-12-05",
            "Charlie,850,2023-02-14",
            "Diana,400,2023-06-20",
            "Eve,800,2022-12-18",
            "Frank,650,2023-01-25",
            "Grace,1000,2023-06-03",
            "Heidi,700,2023-12-30",
        ])
    }

    #[test]
    fn test_highest_and_lowest() {
        let table = sample_table();
        assert_eq!(highest_spenders(&table).unwrap().customers().unwrap(), vec!["Bob"]);
        assert_eq!(lowest_spenders(&table).unwrap().customers().unwrap(), vec!["Diana"]);
    }

    #[test]
    fn test_ties_are_kept() {
        let table = load(&[
            "customer,amount,date",
            "Alice,900,2023-01-01",
            "Bob,300,2023-01-02",
            "Cara,900,2023-01-03",
        ]);
        assert_eq!(
            highest_spenders(&table).unwrap().customers().unwrap(),
            vec!["Alice", "Cara"]
        );
    }

    #[test]
    fn test_average_amount() {
        let table = sample_table();
        let average = average_amount(&table).unwrap().unwrap();
        assert!((average - 750.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table() {
        let table = load(&["customer,amount,date"]);
        assert_eq!(average_amount(&table).unwrap(), None);
        assert!(highest_spenders(&table).unwrap().is_empty());
        assert!(monthly_totals(&table).unwrap().is_empty());
    }

    #[test]
    fn test_large_amounts_do_not_overflow_average() {
        let table = load(&[
            "customer,amount,date",
            "Alice,9223372036854775807,2023-01-01",
            "Bob,1,2023-02-01",
        ]);
        let average = average_amount(&table).unwrap().unwrap();
        assert!((average - 4.611686018427388e18).abs() < 1e6);
    }

    #[test]
    fn test_monthly_total_overflow_is_an_error() {
        let table = load(&[
            "customer,amount,date",
            "Alice,9223372036854775807,2023-01-01",
            "Bob,1,2023-01-15",
        ]);
        assert!(matches!(
            monthly_totals(&table),
            Err(TableError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_earliest_orders() {
        let table = sample_table();
        assert_eq!(earliest_orders(&table).unwrap().customers().unwrap(), vec!["Eve"]);
    }

    #[test]
    fn test_monthly_totals_ignore_year() {
        let table = sample_table();
        let totals = monthly_totals(&table).unwrap();

        let expected = vec![
            MonthTotal { month: Month::January, total: 1150 },
            MonthTotal { month: Month::February, total: 850 },
            MonthTotal { month: Month::June, total: 1400 },
            MonthTotal { month: Month::December, total: 2600 },
        ];
        assert_eq!(totals, expected);
        assert_eq!(busiest_month(&totals).unwrap().name(), "December");
    }

    #[test]
    fn test_busiest_month_tie_prefers_earlier() {
        let totals = vec![
            MonthTotal { month: Month::March, total: 500 },
            MonthTotal { month: Month::May, total: 500 },
        ];
        assert_eq!(busiest_month(&totals).unwrap().month, Month::March);
        assert_eq!(busiest_month(&[]), None);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample_table()).unwrap();
        assert_eq!(summary.highest.height(), 1);
        assert_eq!(summary.lowest.height(), 1);
        assert_eq!(summary.monthly.len(), 4);
        assert_eq!(summary.busiest_month.unwrap().total, 2600);
    }
}
