//! Console report: summary block and ASCII equity chart.
//!
//! Rendering is split into pure `render_*` functions returning `String` so
//! the output is testable; `print_summary` just writes them to stdout.

use crate::result::BacktestResult;

const CHART_WIDTH: usize = 72;
const CHART_HEIGHT: usize = 16;

pub fn print_summary(result: &BacktestResult) {
    println!("{}", render_summary(result));
    println!("{}", render_equity_chart(result, CHART_WIDTH, CHART_HEIGHT));
    if !result.diagnostics.data_quality_warnings.is_empty() {
        println!("Data quality warnings:");
        for warning in &result.diagnostics.data_quality_warnings {
            println!("  - {warning}");
        }
    }
}

pub fn render_summary(result: &BacktestResult) -> String {
    let m = &result.metrics;
    let d = &result.diagnostics;
    let mut out = String::new();

    out.push_str(&format!(
        "Run {}\n",
        &result.run_id[..result.run_id.len().min(12)]
    ));
    out.push_str(&format!(
        "Universe: {} | {} to {} | {} trading days\n\n",
        result.config.universe.join(", "),
        result.config.start_date,
        result.config.end_date,
        d.bar_count,
    ));
    out.push_str(&format!(
        "Starting Portfolio Value: {:>12.2}\n",
        result.starting_value()
    ));
    out.push_str(&format!(
        "Final Portfolio Value:    {:>12.2}\n",
        result.final_value()
    ));
    out.push_str(&format!("Profit:                   {:>11.2}%\n", result.profit_pct()));
    out.push_str(&format!("Sharpe Ratio:             {:>12.3}\n", m.sharpe));
    out.push_str(&format!(
        "Max Drawdown:             {:>11.2}%\n",
        m.max_drawdown * 100.0
    ));
    out.push_str(&format!(
        "Trades: {} closed ({:.0}% winners) | orders: {} submitted, {} filled, {} margin-rejected, {} cancelled\n",
        m.trade_count,
        m.win_rate * 100.0,
        d.orders_submitted,
        d.orders_filled,
        d.orders_margin_rejected,
        d.orders_cancelled,
    ));
    out.push_str(&format!("Commission paid:          {:>12.2}\n", m.total_commission));
    out
}

/// Render the equity curve as a fixed-size ASCII chart.
///
/// Each column is a bucket of consecutive trading days; the marker sits at
/// the bucket's mean equity scaled into the chart's vertical range.
pub fn render_equity_chart(result: &BacktestResult, width: usize, height: usize) -> String {
    let values: Vec<f64> = result.equity_curve.iter().map(|p| p.equity).collect();
    if values.is_empty() || width == 0 || height == 0 {
        return String::new();
    }

    let columns = downsample(&values, width);
    let min = columns.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = columns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if (max - min).abs() < 1e-9 { 1.0 } else { max - min };

    let mut grid = vec![vec![' '; columns.len()]; height];
    for (col, &value) in columns.iter().enumerate() {
        let scaled = ((value - min) / span * (height - 1) as f64).round() as usize;
        let row = height - 1 - scaled.min(height - 1);
        grid[row][col] = '*';
    }

    let mut out = String::new();
    out.push_str("Equity\n");
    for (i, row) in grid.iter().enumerate() {
        let label = if i == 0 {
            format!("{max:>10.0} |")
        } else if i == height - 1 {
            format!("{min:>10.0} |")
        } else {
            format!("{:>10} |", "")
        };
        out.push_str(&label);
        out.push_str(&row.iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&format!(
        "{:>10} +{}\n",
        "",
        "-".repeat(columns.len())
    ));
    if let (Some(first), Some(last)) = (result.equity_curve.first(), result.equity_curve.last()) {
        out.push_str(&format!(
            "{:>12}{}{}{}\n",
            "",
            first.date,
            " ".repeat(columns.len().saturating_sub(20)),
            last.date
        ));
    }
    out
}

/// Bucket values into at most `width` columns by averaging.
fn downsample(values: &[f64], width: usize) -> Vec<f64> {
    if values.len() <= width {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity(width);
    for col in 0..width {
        let start = col * values.len() / width;
        let end = ((col + 1) * values.len() / width).max(start + 1);
        let bucket = &values[start..end.min(values.len())];
        out.push(bucket.iter().sum::<f64>() / bucket.len() as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::runner::run;
    use meanlab_core::data::{SilentProgress, SyntheticProvider};

    fn sample_result() -> BacktestResult {
        run(
            &RunConfig::default(),
            &SyntheticProvider::new(42),
            &SilentProgress,
        )
        .unwrap()
    }

    #[test]
    fn summary_contains_headline_numbers() {
        let result = sample_result();
        let text = render_summary(&result);
        assert!(text.contains("Starting Portfolio Value"));
        assert!(text.contains("Final Portfolio Value"));
        assert!(text.contains("Profit:"));
        assert!(text.contains("Sharpe Ratio"));
        assert!(text.contains("50000.00"));
    }

    #[test]
    fn chart_has_requested_height() {
        let result = sample_result();
        let chart = render_equity_chart(&result, 40, 10);
        // Title + 10 rows + axis + date line.
        assert_eq!(chart.lines().count(), 13);
        assert!(chart.contains('*'));
    }

    #[test]
    fn downsample_preserves_length_bound() {
        let values: Vec<f64> = (0..118).map(|i| i as f64).collect();
        let cols = downsample(&values, 72);
        assert_eq!(cols.len(), 72);
        // Monotone input stays monotone after averaging.
        assert!(cols.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn flat_curve_does_not_divide_by_zero() {
        let mut result = sample_result();
        for p in &mut result.equity_curve {
            p.equity = 50_000.0;
        }
        let chart = render_equity_chart(&result, 40, 8);
        assert!(chart.contains('*'));
    }
}
