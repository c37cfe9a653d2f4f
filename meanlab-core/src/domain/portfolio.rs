//! Portfolio — aggregate state of cash + all open positions.

use super::position::Position;
use super::Symbol;
use std::collections::HashMap;

/// Aggregate portfolio state.
///
/// Tracks cash, open positions, and accumulated commission. The accounting
/// identity must hold at every bar: `equity == cash + sum(position market values)`.
/// Positions are mutated exclusively by the engine's fill logic.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub positions: HashMap<Symbol, Position>,
    pub total_commission: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            positions: HashMap::new(),
            total_commission: 0.0,
        }
    }

    /// Total equity = cash + sum of all position market values.
    ///
    /// Symbols missing from `prices` are marked at their average entry price.
    pub fn equity(&self, prices: &HashMap<Symbol, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .map(|(sym, pos)| {
                let price = prices.get(sym).copied().unwrap_or(pos.avg_entry_price);
                pos.market_value(price)
            })
            .sum();
        self.cash + position_value
    }

    /// Whether a symbol has an open position.
    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.get(symbol).is_some_and(|p| !p.is_flat())
    }

    /// Get a position by symbol (if exists and not flat).
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol).filter(|p| !p.is_flat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn long(symbol: &str, quantity: u64, price: f64) -> Position {
        Position {
            symbol: symbol.into(),
            quantity,
            avg_entry_price: price,
            entry_bar: 0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            entry_commission: 0.0,
        }
    }

    #[test]
    fn equity_with_no_positions() {
        let portfolio = Portfolio::new(50_000.0);
        let prices = HashMap::new();
        assert_eq!(portfolio.equity(&prices), 50_000.0);
    }

    #[test]
    fn equity_with_position() {
        let mut portfolio = Portfolio::new(40_000.0);
        portfolio
            .positions
            .insert("AAPL".into(), long("AAPL", 100, 100.0));
        let mut prices = HashMap::new();
        prices.insert("AAPL".into(), 110.0);
        // 40_000 + 100 * 110 = 51_000
        assert_eq!(portfolio.equity(&prices), 51_000.0);
    }

    #[test]
    fn equity_falls_back_to_entry_price() {
        let mut portfolio = Portfolio::new(0.0);
        portfolio
            .positions
            .insert("NFLX".into(), long("NFLX", 10, 500.0));
        assert_eq!(portfolio.equity(&HashMap::new()), 5_000.0);
    }

    #[test]
    fn has_position_checks() {
        let mut portfolio = Portfolio::new(50_000.0);
        assert!(!portfolio.has_position("AAPL"));
        portfolio
            .positions
            .insert("AAPL".into(), long("AAPL", 100, 100.0));
        assert!(portfolio.has_position("AAPL"));
    }
}
