//! Run orchestration: config → data → engine → result.

use meanlab_core::data::{DataProvider, DownloadProgress};
use meanlab_core::engine::run_backtest;
use thiserror::Error;

use crate::config::RunConfig;
use crate::data_loader::{load_universe, LoadError};
use crate::metrics::PerformanceMetrics;
use crate::result::{BacktestResult, EquityPoint, RunDiagnostics};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid config: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Execute a full backtest: load the universe, run the engine, compute
/// metrics, and assemble the result.
pub fn run(
    config: &RunConfig,
    provider: &dyn DataProvider,
    progress: &dyn DownloadProgress,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let aligned = load_universe(config, provider, progress)?;

    let strategy = config.strategy_params();
    let engine_config = config.engine_config();
    let engine_result = run_backtest(&aligned, &strategy, &engine_config);

    let metrics = PerformanceMetrics::compute(
        &engine_result.equity_curve,
        &engine_result.trades,
        engine_result.total_commission,
    );

    let equity_curve = aligned
        .dates
        .iter()
        .zip(&engine_result.equity_curve)
        .map(|(&date, &equity)| EquityPoint { date, equity })
        .collect();

    Ok(BacktestResult {
        run_id: config.run_id(),
        config: config.clone(),
        equity_curve,
        trades: engine_result.trades,
        metrics,
        diagnostics: RunDiagnostics {
            bar_count: engine_result.bar_count,
            warmup_bars: engine_result.warmup_bars,
            orders_submitted: engine_result.orders_submitted,
            orders_filled: engine_result.orders_filled,
            orders_margin_rejected: engine_result.orders_margin_rejected,
            orders_cancelled: engine_result.orders_cancelled,
            flat_band_skips: engine_result.flat_band_skips,
            data_quality_warnings: engine_result.data_quality_warnings,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meanlab_core::data::{SilentProgress, SyntheticProvider};

    #[test]
    fn full_run_on_synthetic_data() {
        let config = RunConfig::default();
        let provider = SyntheticProvider::new(42);
        let result = run(&config, &provider, &SilentProgress).unwrap();

        assert_eq!(result.run_id, config.run_id());
        assert_eq!(result.equity_curve.len(), result.diagnostics.bar_count);
        assert!((result.equity_curve[0].equity - 50_000.0).abs() < 1e-9);
        assert!(result.equity_curve.iter().all(|p| p.equity.is_finite()));
        // Dates on the curve are strictly increasing.
        assert!(result
            .equity_curve
            .windows(2)
            .all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn same_config_same_data_same_result() {
        let config = RunConfig::default();
        let a = run(&config, &SyntheticProvider::new(7), &SilentProgress).unwrap();
        let b = run(&config, &SyntheticProvider::new(7), &SilentProgress).unwrap();

        assert_eq!(a.final_value(), b.final_value());
        assert_eq!(a.trades.len(), b.trades.len());
    }

    #[test]
    fn profit_pct_consistent_with_curve() {
        let config = RunConfig::default();
        let result = run(&config, &SyntheticProvider::new(3), &SilentProgress).unwrap();
        let expected = (result.final_value() - 50_000.0) / 50_000.0 * 100.0;
        assert!((result.profit_pct() - expected).abs() < 1e-9);
    }
}
