//! Order types and the single-order lifecycle.
//!
//! MeanLab only needs market orders that fill at the next bar's open.
//! The lifecycle is the three-state machine the strategy tracks per symbol:
//! no order → `Pending` → terminal (`Filled`, `Cancelled`, `MarginRejected`),
//! after which the symbol's slot is free again.

use serde::{Deserialize, Serialize};

/// Buy or sell side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Submitted, waiting for the next bar's open.
    Pending,
    /// Completely filled.
    Filled,
    /// Cancelled (end of data reached before a fill).
    Cancelled,
    /// Rejected at fill time: cost plus commission exceeded available cash.
    MarginRejected,
}

impl OrderStatus {
    /// Terminal states free the symbol's order slot.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

/// A market order for a whole-share quantity, filling at the next open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub status: OrderStatus,
    /// Bar index at which the order was submitted.
    pub created_bar: usize,
}

impl Order {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: u64, bar: usize) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            status: OrderStatus::Pending,
            created_bar: bar,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_starts_pending() {
        let order = Order::market("AAPL", OrderSide::Buy, 100, 3);
        assert!(order.is_active());
        assert_eq!(order.created_bar, 3);
    }

    #[test]
    fn terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::MarginRejected.is_terminal());
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = Order::market("TSLA", OrderSide::Sell, 42, 10);
        let json = serde_json::to_string(&order).unwrap();
        let deser: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.symbol, deser.symbol);
        assert_eq!(order.quantity, deser.quantity);
        assert_eq!(order.status, deser.status);
    }
}
