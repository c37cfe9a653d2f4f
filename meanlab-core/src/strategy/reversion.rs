//! Bollinger-Band mean reversion.
//!
//! Entry: close strictly below the lower band while flat → buy, sized to put
//! half of available cash into the position. Exit: %B at or above the exit
//! threshold while holding → liquidate. A pending order blocks any new
//! decision for that symbol until the engine reports a terminal state.

use serde::{Deserialize, Serialize};

use crate::indicators::percent_b;

/// Strategy parameters. Defaults mirror the canonical run:
/// 20-bar bands at 2 standard deviations, exit at %B ≥ 0.7.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerReversion {
    pub period: usize,
    pub devfactor: f64,
    /// %B level at which a held position is closed.
    pub exit_threshold: f64,
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self {
            period: 20,
            devfactor: 2.0,
            exit_threshold: 0.7,
        }
    }
}

/// Everything the decision rule may look at for one symbol on one bar.
///
/// Band values are NaN during indicator warmup; close is NaN on void bars.
#[derive(Debug, Clone, Copy)]
pub struct BarSnapshot {
    pub close: f64,
    pub lower_band: f64,
    pub upper_band: f64,
    /// Cash available in the portfolio at decision time.
    pub cash: f64,
    pub has_position: bool,
    pub order_pending: bool,
}

/// What the strategy wants done for a symbol on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Submit a market buy for `size` whole shares.
    Buy { size: u64 },
    /// Liquidate the entire position.
    Close,
    Hold,
    /// Hold forced by a zero-width band (%B undefined). Reported separately
    /// so the run can surface a data-quality warning.
    SkipFlatBand,
}

impl BollingerReversion {
    pub fn name(&self) -> &'static str {
        "bollinger_reversion"
    }

    /// Bars needed before the bands produce valid output.
    pub fn warmup_bars(&self) -> usize {
        self.period.saturating_sub(1)
    }

    /// Decide the action for one symbol on one bar.
    ///
    /// At most one order may be outstanding per symbol: while one is pending
    /// the answer is always `Hold`, whatever the price does.
    pub fn decide(&self, snap: &BarSnapshot) -> Action {
        if snap.order_pending {
            return Action::Hold;
        }
        // Warmup or void bar: bands or close not yet defined.
        if snap.close.is_nan() || snap.lower_band.is_nan() || snap.upper_band.is_nan() {
            return Action::Hold;
        }

        if !snap.has_position {
            if snap.close < snap.lower_band {
                let size = (snap.cash / (2.0 * snap.close)).floor();
                if size >= 1.0 {
                    return Action::Buy { size: size as u64 };
                }
            }
            return Action::Hold;
        }

        match percent_b(snap.close, snap.lower_band, snap.upper_band) {
            Some(pb) if pb >= self.exit_threshold => Action::Close,
            Some(_) => Action::Hold,
            // Band collapsed to zero width: defined skip, never NaN math.
            None => Action::SkipFlatBand,
        }
    }
}
