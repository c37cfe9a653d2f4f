//! Bar-by-bar event loop.
//!
//! The run is strictly sequential: indicators are precomputed per symbol, then
//! every bar is processed in chronological lockstep across all symbols with
//! two phases per bar:
//!
//! 1. **Open phase** — pending orders from earlier bars fill at this bar's
//!    open (or are margin-rejected). Terminal outcomes free the symbol's slot.
//! 2. **Close phase** — the decision rule runs on this bar's close and band
//!    values and may submit at most one new order per symbol.
//!
//! After both phases, equity is marked at the last known close of every
//! symbol. Orders still pending when data runs out are cancelled.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::fills::{fill_buy, fill_close, FillOutcome};
use super::order_slots::OrderSlots;
use super::EngineConfig;
use crate::data::AlignedData;
use crate::domain::{Order, OrderSide, OrderStatus, Portfolio, TradeRecord};
use crate::indicators::{Bollinger, Indicator, IndicatorValues};
use crate::strategy::{Action, BarSnapshot, BollingerReversion};

/// Result of a single engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Equity marked after every bar; same length as the date axis.
    pub equity_curve: Vec<f64>,
    /// Completed round trips in exit order.
    pub trades: Vec<TradeRecord>,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub orders_submitted: usize,
    pub orders_filled: usize,
    pub orders_margin_rejected: usize,
    /// Orders still pending at the end of data.
    pub orders_cancelled: usize,
    /// Bars skipped because the band collapsed to zero width (%B undefined).
    pub flat_band_skips: usize,
    pub data_quality_warnings: Vec<String>,
    pub final_cash: f64,
    pub total_commission: f64,
}

/// Run the mean-reversion backtest over aligned multi-symbol data.
pub fn run_backtest(
    aligned: &AlignedData,
    strategy: &BollingerReversion,
    config: &EngineConfig,
) -> RunResult {
    let n = aligned.dates.len();
    let lower_ind = Bollinger::lower(strategy.period, strategy.devfactor);
    let upper_ind = Bollinger::upper(strategy.period, strategy.devfactor);
    let lower_name = lower_ind.name().to_string();
    let upper_name = upper_ind.name().to_string();

    let mut bands: HashMap<&str, IndicatorValues> = HashMap::new();
    for symbol in &aligned.symbols {
        let bars = &aligned.bars[symbol];
        let mut values = IndicatorValues::new();
        values.insert(lower_name.clone(), lower_ind.compute(bars));
        values.insert(upper_name.clone(), upper_ind.compute(bars));
        bands.insert(symbol.as_str(), values);
    }

    let mut portfolio = Portfolio::new(config.initial_capital);
    let mut slots = OrderSlots::new();
    let mut last_prices: HashMap<String, f64> = HashMap::new();

    let mut equity_curve = Vec::with_capacity(n);
    let mut trades: Vec<TradeRecord> = Vec::new();
    let mut orders_submitted = 0;
    let mut orders_filled = 0;
    let mut orders_margin_rejected = 0;
    let mut flat_band_skips = 0;

    for i in 0..n {
        let date = aligned.dates[i];

        // ── Open phase: fill orders submitted on earlier bars ──
        for symbol in &aligned.symbols {
            let bar = &aligned.bars[symbol][i];
            let Some(mut order) = slots.take(symbol) else {
                continue;
            };
            debug_assert!(order.is_active());
            // Same-bar orders wait for the next open; void bars defer the
            // fill until the symbol trades again.
            if order.created_bar >= i || bar.open.is_nan() {
                slots.submit(order);
                continue;
            }

            match order.side {
                OrderSide::Buy => {
                    match fill_buy(
                        &mut portfolio,
                        &order,
                        bar.open,
                        date,
                        i,
                        config.commission_rate,
                    ) {
                        FillOutcome::Opened => {
                            order.status = OrderStatus::Filled;
                            orders_filled += 1;
                        }
                        FillOutcome::MarginRejected => {
                            order.status = OrderStatus::MarginRejected;
                            orders_margin_rejected += 1;
                        }
                        FillOutcome::Closed(_) => unreachable!("buy cannot close"),
                    }
                }
                OrderSide::Sell => {
                    if let Some(trade) = fill_close(
                        &mut portfolio,
                        symbol,
                        bar.open,
                        date,
                        i,
                        config.commission_rate,
                    ) {
                        order.status = OrderStatus::Filled;
                        orders_filled += 1;
                        trades.push(trade);
                    } else {
                        // Nothing to close: treat as cancelled.
                        order.status = OrderStatus::Cancelled;
                    }
                }
            }
            // Terminal state reached either way: the slot stays free.
            debug_assert!(order.status.is_terminal());
        }

        // ── Close phase: evaluate the decision rule per symbol ──
        for symbol in &aligned.symbols {
            let bar = &aligned.bars[symbol][i];
            let values = &bands[symbol.as_str()];
            let snap = BarSnapshot {
                close: bar.close,
                lower_band: values.get(&lower_name, i).unwrap_or(f64::NAN),
                upper_band: values.get(&upper_name, i).unwrap_or(f64::NAN),
                cash: portfolio.cash,
                has_position: portfolio.has_position(symbol),
                order_pending: slots.is_pending(symbol),
            };

            match strategy.decide(&snap) {
                Action::Buy { size } => {
                    slots.submit(Order::market(symbol, OrderSide::Buy, size, i));
                    orders_submitted += 1;
                }
                Action::Close => {
                    let quantity = portfolio
                        .get_position(symbol)
                        .map(|p| p.quantity)
                        .unwrap_or(0);
                    slots.submit(Order::market(symbol, OrderSide::Sell, quantity, i));
                    orders_submitted += 1;
                }
                Action::Hold => {}
                Action::SkipFlatBand => flat_band_skips += 1,
            }
        }

        // ── Mark equity at the last known close ──
        for symbol in &aligned.symbols {
            let close = aligned.bars[symbol][i].close;
            if !close.is_nan() {
                last_prices.insert(symbol.clone(), close);
            }
        }
        equity_curve.push(portfolio.equity(&last_prices));
    }

    // End of data: outstanding orders are cancelled.
    let orders_cancelled = slots.drain().len();

    let mut data_quality_warnings = Vec::new();
    if flat_band_skips > 0 {
        data_quality_warnings.push(format!(
            "{flat_band_skips} bar(s) skipped: Bollinger band width was zero (flat volatility), %B undefined"
        ));
    }

    RunResult {
        equity_curve,
        trades,
        bar_count: n,
        warmup_bars: strategy.warmup_bars(),
        orders_submitted,
        orders_filled,
        orders_margin_rejected,
        orders_cancelled,
        flat_band_skips,
        data_quality_warnings,
        final_cash: portfolio.cash,
        total_commission: portfolio.total_commission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{align_symbols, RawBar};
    use chrono::NaiveDate;

    /// Build aligned single-symbol data from closes; open = previous close.
    fn aligned_from_closes(symbol: &str, closes: &[f64]) -> AlignedData {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars: Vec<RawBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                RawBar {
                    date: base + chrono::Duration::days(i as i64),
                    open,
                    high: open.max(close) + 1.0,
                    low: open.min(close) - 1.0,
                    close,
                    volume: 1000,
                }
            })
            .collect();
        let mut map = HashMap::new();
        map.insert(symbol.to_string(), bars);
        align_symbols(map)
    }

    /// Short warmup and a 1-sigma band so small series can cross it.
    fn short_strategy() -> BollingerReversion {
        BollingerReversion {
            period: 3,
            devfactor: 1.0,
            exit_threshold: 0.7,
        }
    }

    #[test]
    fn no_trades_on_flat_data_without_dip() {
        // Monotonically rising prices never cross below the lower band.
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let aligned = aligned_from_closes("AAPL", &closes);
        let result = run_backtest(&aligned, &short_strategy(), &EngineConfig::default());

        assert_eq!(result.orders_submitted, 0);
        assert_eq!(result.trades.len(), 0);
        // Equity stays at initial capital: no fills, no commission.
        assert!(result
            .equity_curve
            .iter()
            .all(|&e| (e - 50_000.0).abs() < 1e-9));
    }

    #[test]
    fn dip_triggers_entry_and_fill_next_open() {
        // Stable around 100, then a sharp dip below the lower band.
        let closes = vec![100.0, 100.0, 100.0, 100.0, 101.0, 80.0, 85.0, 90.0];
        let aligned = aligned_from_closes("AAPL", &closes);
        let config = EngineConfig::default();
        let result = run_backtest(&aligned, &short_strategy(), &config);

        assert!(result.orders_submitted >= 1);
        assert!(result.orders_filled >= 1);
        // Cash moved: a buy was filled.
        assert!(result.final_cash < config.initial_capital);
    }

    #[test]
    fn order_pending_at_end_is_cancelled() {
        // Dip on the very last bar: order submitted but data ends.
        let closes = vec![100.0, 100.0, 100.0, 100.0, 101.0, 80.0];
        let aligned = aligned_from_closes("AAPL", &closes);
        let result = run_backtest(&aligned, &short_strategy(), &EngineConfig::default());

        assert_eq!(result.orders_submitted, 1);
        assert_eq!(result.orders_filled, 0);
        assert_eq!(result.orders_cancelled, 1);
    }

    #[test]
    fn flat_band_produces_warning_not_nan() {
        // Enter on a dip, then constant prices collapse the band while holding.
        let mut closes = vec![100.0, 100.0, 100.0, 100.0, 101.0, 80.0];
        closes.extend(std::iter::repeat(80.0).take(10));
        let aligned = aligned_from_closes("AAPL", &closes);
        let result = run_backtest(&aligned, &short_strategy(), &EngineConfig::default());

        assert!(result.flat_band_skips > 0);
        assert_eq!(result.data_quality_warnings.len(), 1);
        assert!(result.equity_curve.iter().all(|e| e.is_finite()));
    }

    #[test]
    fn equity_identity_holds_every_bar() {
        // Deterministic single round trip, replayed by hand:
        // - bar 5 dips to 80 below the ~84.0 lower band; the buy fills at the
        //   bar-6 open of 80 for floor(50_000 / 160) = 312 shares
        // - bar 7 closes at 95 with %B ~1.17; the close fills at the bar-8
        //   open of 95
        // Equity on every held bar must equal cash + 312 * close.
        let closes = vec![100.0, 100.0, 100.0, 100.0, 101.0, 80.0, 85.0, 95.0, 96.0];
        let aligned = aligned_from_closes("AAPL", &closes);
        let result = run_backtest(&aligned, &short_strategy(), &EngineConfig::default());

        assert_eq!(result.equity_curve.len(), closes.len());
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].quantity, 312);

        // Flat through warmup and while the entry order is pending.
        for i in 0..=5 {
            assert!((result.equity_curve[i] - 50_000.0).abs() < 1e-9, "bar {i}");
        }

        // Held bars: identity against the hand-computed cash balance.
        let entry_commission = 312.0 * 80.0 * 0.001;
        let cash_held = 50_000.0 - 312.0 * 80.0 - entry_commission;
        assert!((result.equity_curve[6] - (cash_held + 312.0 * 85.0)).abs() < 1e-9);
        assert!((result.equity_curve[7] - (cash_held + 312.0 * 95.0)).abs() < 1e-9);

        // Flat again after the exit fill: equity collapses to cash.
        let exit_commission = 312.0 * 95.0 * 0.001;
        let cash_final = cash_held + 312.0 * 95.0 - exit_commission;
        assert!((result.equity_curve[8] - cash_final).abs() < 1e-9);
        assert!((result.final_cash - cash_final).abs() < 1e-9);
    }

    #[test]
    fn two_symbols_run_in_lockstep() {
        let closes_a = vec![100.0, 100.0, 100.0, 100.0, 101.0, 80.0, 85.0, 95.0];
        let closes_b = vec![200.0, 201.0, 202.0, 203.0, 204.0, 205.0, 206.0, 207.0];
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let to_raw = |closes: &[f64]| -> Vec<RawBar> {
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| {
                    let open = if i == 0 { close } else { closes[i - 1] };
                    RawBar {
                        date: base + chrono::Duration::days(i as i64),
                        open,
                        high: open.max(close) + 1.0,
                        low: open.min(close) - 1.0,
                        close,
                        volume: 1000,
                    }
                })
                .collect()
        };
        let mut map = HashMap::new();
        map.insert("AAPL".to_string(), to_raw(&closes_a));
        map.insert("TSLA".to_string(), to_raw(&closes_b));
        let aligned = align_symbols(map);

        let result = run_backtest(&aligned, &short_strategy(), &EngineConfig::default());
        // Only the dipping symbol trades.
        assert!(result.orders_submitted >= 1);
        assert_eq!(result.bar_count, 8);
    }
}
