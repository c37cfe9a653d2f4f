//! Performance metrics — pure functions over the equity curve and trade log.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar
//! out. No dependencies on the runner, data pipeline, or engine.

use meanlab_core::domain::TradeRecord;
use serde::{Deserialize, Serialize};

/// Aggregate performance metrics for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total return as a fraction (0.05 = +5%).
    pub total_return: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub trade_count: usize,
    pub avg_trade_pnl: f64,
    pub total_commission: f64,
}

impl PerformanceMetrics {
    pub fn compute(
        equity_curve: &[f64],
        trades: &[TradeRecord],
        total_commission: f64,
    ) -> Self {
        Self {
            total_return: total_return(equity_curve),
            sharpe: sharpe_ratio(equity_curve, 0.0),
            max_drawdown: max_drawdown(equity_curve),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            trade_count: trades.len(),
            avg_trade_pnl: avg_trade_pnl(trades),
            total_commission,
        }
    }
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let initial = equity_curve[0];
    let Some(&final_eq) = equity_curve.last() else {
        return 0.0;
    };
    if initial <= 0.0 {
        return 0.0;
    }
    (final_eq - initial) / initial
}

/// Annualized Sharpe ratio from daily returns.
///
/// Sharpe = mean(daily returns - rf) / std(daily returns) * sqrt(252).
/// Returns 0.0 if variance is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / 252.0;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let mean = mean_f64(&excess);
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Maximum drawdown as a negative fraction (-0.15 = 15% drawdown).
///
/// Returns 0.0 for constant or monotonically rising equity.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Win rate: fraction of trades with positive net PnL.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross profits / gross losses. Capped at 100.0 when there
/// are no losing trades.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.net_pnl > 0.0)
        .map(|t| t.net_pnl)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.net_pnl < 0.0)
        .map(|t| -t.net_pnl)
        .sum();
    if gross_loss < 1e-15 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Mean net PnL per trade.
pub fn avg_trade_pnl(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.net_pnl).sum::<f64>() / trades.len() as f64
}

/// Simple daily returns from the equity curve, skipping zero-equity bars.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
