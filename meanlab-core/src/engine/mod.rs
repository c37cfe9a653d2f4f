//! Backtest engine — bar-by-bar event loop with broker accounting.

mod event_loop;
mod fills;
mod order_slots;

pub use event_loop::{run_backtest, RunResult};
pub use fills::FillOutcome;
pub use order_slots::OrderSlots;

use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting cash.
    pub initial_capital: f64,
    /// Commission charged per fill as a fraction of notional value.
    pub commission_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 50_000.0,
            commission_rate: 0.001,
        }
    }
}
