//! Complete result of a backtest run.

use chrono::NaiveDate;
use meanlab_core::domain::TradeRecord;
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, RunId};
use crate::metrics::PerformanceMetrics;

/// Everything a run produced: dated equity curve, trade log, metrics, and
/// the order/data-quality counters from the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub config: RunConfig,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeRecord>,
    pub metrics: PerformanceMetrics,
    pub diagnostics: RunDiagnostics,
}

/// Single point in the equity curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Order-flow and data-quality counters carried out of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub orders_submitted: usize,
    pub orders_filled: usize,
    pub orders_margin_rejected: usize,
    pub orders_cancelled: usize,
    pub flat_band_skips: usize,
    pub data_quality_warnings: Vec<String>,
}

impl BacktestResult {
    pub fn starting_value(&self) -> f64 {
        self.config.initial_capital
    }

    pub fn final_value(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.config.initial_capital)
    }

    /// Profit as a percentage of starting capital.
    pub fn profit_pct(&self) -> f64 {
        let start = self.starting_value();
        if start <= 0.0 {
            return 0.0;
        }
        (self.final_value() - start) / start * 100.0
    }
}
