//! TradeRecord — a completed round-trip trade.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A complete round-trip trade record: entry fill → exit fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,

    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    pub quantity: u64,

    pub gross_pnl: f64,
    /// Commission paid on both fills.
    pub commission: f64,
    pub net_pnl: f64,

    pub bars_held: usize,
}

impl TradeRecord {
    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0 {
            return 0.0;
        }
        self.net_pnl / (self.entry_price * self.quantity as f64)
    }

    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> TradeRecord {
        TradeRecord {
            symbol: "AAPL".into(),
            entry_bar: 4,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            entry_price: 100.0,
            exit_bar: 8,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            exit_price: 110.0,
            quantity: 50,
            gross_pnl: 500.0,
            commission: 10.5,
            net_pnl: 489.5,
            bars_held: 4,
        }
    }

    #[test]
    fn return_pct_calculation() {
        let trade = sample_trade();
        let expected = 489.5 / (100.0 * 50.0);
        assert!((trade.return_pct() - expected).abs() < 1e-10);
    }

    #[test]
    fn is_winner() {
        assert!(sample_trade().is_winner());
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.symbol, deser.symbol);
        assert_eq!(trade.net_pnl, deser.net_pnl);
        assert_eq!(trade.quantity, deser.quantity);
    }
}
