//! Strategy decision logic.
//!
//! The decision rule is a pure function of per-bar market and account state.
//! It never touches the engine, so the entry/exit/pending behavior can be
//! tested exhaustively without running a simulation.

mod reversion;

pub use reversion::{Action, BarSnapshot, BollingerReversion};
