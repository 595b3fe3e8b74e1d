//! Chart rendering with Plotters and the console spending report

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use tracing::{info, warn};

use crate::config::ChartStyle;
use crate::data::{OrderTable, SpendingTiers};
use crate::stats::{MonthTotal, SpendSummary};

const HIGHEST_CHART: &str = "highest_spender.png";
const LOWEST_CHART: &str = "lowest_spender.png";
const AVERAGE_CHART: &str = "average_amount.png";
const DATE_CHART: &str = "orders_by_date.png";
const MONTH_CHART: &str = "orders_by_month.png";

const MIN_MARKER: f64 = 4.0;
const MAX_MARKER: f64 = 14.0;

/// One bar chart: a bar per label plus a horizontal reference line
struct BarChart<'a> {
    title: &'a str,
    x_desc: &'a str,
    legend: String,
    labels: &'a [String],
    values: &'a [i64],
    highlighted: Vec<bool>,
    reference: f64,
}

fn draw_bar_chart(
    bars: &BarChart<'_>,
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    let n_bars = bars.values.len();
    if n_bars == 0 {
        anyhow::bail!("no data to chart for {}", output_path.display());
    }

    let tallest = bars.values.iter().copied().max().unwrap_or(0) as f64;
    let y_max = tallest.max(bars.reference).max(1.0) * 1.15;
    let x_range = -0.5f64..(n_bars as f64 - 0.5);

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10);
    if style.labels {
        builder
            .caption(bars.title, ("sans-serif", 30))
            .x_label_area_size(50)
            .y_label_area_size(60);
    }
    let mut chart = builder.build_cartesian_2d(x_range.clone(), 0f64..y_max)?;

    if style.labels {
        let labels = bars.labels;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n_bars)
            .x_label_formatter(&|x| category_label(labels, *x))
            .x_desc(bars.x_desc)
            .y_desc("Order amount")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;
    }

    chart.draw_series(bars.values.iter().enumerate().map(|(i, &value)| {
        let color = if bars.highlighted[i] {
            style.highlight
        } else {
            style.base
        };
        Rectangle::new(
            [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, value as f64)],
            color.filled(),
        )
    }))?;

    let line_color = style.highlight;
    chart
        .draw_series(LineSeries::new(
            vec![(x_range.start, bars.reference), (x_range.end, bars.reference)],
            line_color.stroke_width(2),
        ))?
        .label(bars.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2)));

    if style.labels {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    root.present()?;
    info!(path = %output_path.display(), "chart saved");
    Ok(())
}

/// Label for the bar nearest `x`, blank between bars
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Bar per order with the largest amounts highlighted
pub fn create_highest_spender_chart(
    customers: &[String],
    amounts: &[i64],
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    let max = amounts.iter().copied().max().unwrap_or(0);
    draw_bar_chart(
        &BarChart {
            title: "Total order amount per customer",
            x_desc: "Customers",
            legend: format!("Highest amount spent: {max}"),
            labels: customers,
            values: amounts,
            highlighted: amounts.iter().map(|&a| a == max).collect(),
            reference: max as f64,
        },
        style,
        output_path,
    )
}

/// Bar per order with the smallest amounts highlighted
pub fn create_lowest_spender_chart(
    customers: &[String],
    amounts: &[i64],
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    let min = amounts.iter().copied().min().unwrap_or(0);
    draw_bar_chart(
        &BarChart {
            title: "Total order amount per customer",
            x_desc: "Customers",
            legend: format!("Lowest amount spent: {min}"),
            labels: customers,
            values: amounts,
            highlighted: amounts.iter().map(|&a| a == min).collect(),
            reference: min as f64,
        },
        style,
        output_path,
    )
}

/// Bar per order with a reference line at the mean
pub fn create_average_chart(
    customers: &[String],
    amounts: &[i64],
    average: f64,
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    draw_bar_chart(
        &BarChart {
            title: "Total order amount per customer",
            x_desc: "Customers",
            legend: format!("Average order amount: {average:.2}"),
            labels: customers,
            values: amounts,
            highlighted: vec![false; amounts.len()],
            reference: average,
        },
        style,
        output_path,
    )
}

/// Monthly totals in calendar order, busiest month highlighted
pub fn create_monthly_chart(
    monthly: &[MonthTotal],
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    let labels: Vec<String> = monthly.iter().map(|m| m.name().to_string()).collect();
    let totals: Vec<i64> = monthly.iter().map(|m| m.total).collect();
    let best = totals.iter().copied().max().unwrap_or(0);

    draw_bar_chart(
        &BarChart {
            title: "Total orders per month",
            x_desc: "Month",
            legend: format!("Highest order amount: {best}"),
            labels: &labels,
            values: &totals,
            highlighted: totals.iter().map(|&t| t == best).collect(),
            reference: best as f64,
        },
        style,
        output_path,
    )
}

/// Scatter plot of orders by date and customer, marker size and shade scaled by amount
pub fn create_order_date_scatter(
    customers: &[String],
    dates: &[NaiveDate],
    amounts: &[i64],
    style: &ChartStyle,
    output_path: &Path,
) -> crate::Result<()> {
    if dates.is_empty() {
        anyhow::bail!("no data to chart for {}", output_path.display());
    }

    // one row per distinct customer, first appearance first
    let mut rows: Vec<String> = Vec::new();
    for customer in customers {
        if !rows.contains(customer) {
            rows.push(customer.clone());
        }
    }

    let days: Vec<f64> = dates.iter().map(|d| d.num_days_from_ce() as f64).collect();
    let first_day = days.iter().copied().fold(f64::INFINITY, f64::min) - 3.0;
    let last_day = days.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0;
    let (low, high) = amount_bounds(amounts);

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10);
    if style.labels {
        builder
            .caption("Customer order by date", ("sans-serif", 30))
            .x_label_area_size(60)
            .y_label_area_size(80);
    }
    let mut chart =
        builder.build_cartesian_2d(first_day..last_day, -0.5f64..(rows.len() as f64 - 0.5))?;

    if style.labels {
        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|x| day_label(*x))
            .y_labels(rows.len())
            .y_label_formatter(&|y| category_label(&rows, *y))
            .x_desc("Date")
            .y_desc("Customers")
            .axis_desc_style(("sans-serif", 15))
            .draw()?;
    }

    let points = customers.iter().zip(&days).zip(amounts).filter_map(|((customer, &day), &amount)| {
        let row = rows.iter().position(|r| r == customer)?;
        let weight = amount_weight(amount, low, high);
        let color = blend(style.base, style.highlight, weight);
        Some(Circle::new(
            (day, row as f64),
            marker_radius(weight),
            color.filled(),
        ))
    });
    chart.draw_series(points)?;

    root.present()?;
    info!(path = %output_path.display(), "chart saved");
    Ok(())
}

fn day_label(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day.round() as i32)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn amount_bounds(amounts: &[i64]) -> (i64, i64) {
    let low = amounts.iter().copied().min().unwrap_or(0);
    let high = amounts.iter().copied().max().unwrap_or(0);
    (low, high)
}

/// Position of `amount` between the bounds, in 0..=1
fn amount_weight(amount: i64, low: i64, high: i64) -> f64 {
    if high <= low {
        return 1.0;
    }
    ((amount as f64 - low as f64) / (high as f64 - low as f64)).clamp(0.0, 1.0)
}

fn marker_radius(weight: f64) -> i32 {
    (MIN_MARKER + (MAX_MARKER - MIN_MARKER) * weight).round() as i32
}

/// Linear mix of two colours, `weight` 0 gives `from`
fn blend(from: RGBColor, to: RGBColor, weight: f64) -> RGBColor {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * weight).round() as u8;
    RGBColor(channel(from.0, to.0), channel(from.1, to.1), channel(from.2, to.2))
}

/// Print the tier split and the answers to each spending question
pub fn print_summary(threshold: i64, tiers: &SpendingTiers, summary: &SpendSummary) {
    println!("\n=== Spending Tiers (threshold {}) ===", threshold);
    println!("Low spending orders:  {}", tiers.low.height());
    println!("High spending orders: {}", tiers.high.height());

    println!("\nThe highest spending customer is:\n{}\n", summary.highest);
    println!("The customer who placed the lowest order amount:\n{}\n", summary.lowest);

    match summary.average {
        Some(average) => println!("The average order amount across all customers is {:.2}\n", average),
        None => println!("No orders to average\n"),
    }

    println!("The earliest order was placed by:\n{}\n", summary.earliest);

    if let Some(busiest) = summary.busiest_month {
        println!(
            "The month with the most orders was {} at {}",
            busiest.name(),
            busiest.total
        );
    }
}

/// Render every chart into `output_dir`, returning the written paths
pub fn generate_visualization_report(
    table: &OrderTable,
    summary: &SpendSummary,
    style: &ChartStyle,
    output_dir: &Path,
) -> crate::Result<Vec<PathBuf>> {
    if table.is_empty() {
        warn!("no orders loaded; skipping charts");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(output_dir)?;

    let customers = table.customers()?;
    let amounts = table.amounts()?;
    let dates = table.dates()?;
    let path = |name: &str| output_dir.join(name);

    create_highest_spender_chart(&customers, &amounts, style, &path(HIGHEST_CHART))?;
    create_lowest_spender_chart(&customers, &amounts, style, &path(LOWEST_CHART))?;
    if let Some(average) = summary.average {
        create_average_chart(&customers, &amounts, average, style, &path(AVERAGE_CHART))?;
    }
    create_order_date_scatter(&customers, &dates, &amounts, style, &path(DATE_CHART))?;
    create_monthly_chart(&summary.monthly, style, &path(MONTH_CHART))?;

    Ok([HIGHEST_CHART, LOWEST_CHART, AVERAGE_CHART, DATE_CHART, MONTH_CHART]
        .iter()
        .map(|name| path(*name))
        .filter(|p| p.exists())
        .collect())
}
