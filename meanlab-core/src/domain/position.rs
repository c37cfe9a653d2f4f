use serde::{Deserialize, Serialize};

/// Long position in a single symbol (whole shares).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    pub avg_entry_price: f64,
    /// Bar index of the entry fill.
    pub entry_bar: usize,
    pub entry_date: chrono::NaiveDate,
    /// Commission paid on the entry fill, folded into the trade record at exit.
    pub entry_commission: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity as f64 * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity as f64 * (current_price - self.avg_entry_price)
    }
}
