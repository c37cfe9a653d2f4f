//! Per-symbol pending-order slots.
//!
//! Invariant: at most one outstanding order per symbol. The slot is occupied
//! from submission until the engine reports a terminal state, at which point
//! it is cleared and the symbol may act again on a later bar.

use crate::domain::Order;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct OrderSlots {
    slots: HashMap<String, Order>,
}

impl OrderSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a symbol currently has an outstanding order.
    pub fn is_pending(&self, symbol: &str) -> bool {
        self.slots.contains_key(symbol)
    }

    /// Occupy the symbol's slot. Returns false (and drops the order) if the
    /// slot is already occupied — callers check `is_pending` first, so a
    /// rejection here means a strategy bug, not a market condition.
    pub fn submit(&mut self, order: Order) -> bool {
        if self.slots.contains_key(&order.symbol) {
            return false;
        }
        self.slots.insert(order.symbol.clone(), order);
        true
    }

    /// Remove and return the symbol's outstanding order, freeing the slot.
    pub fn take(&mut self, symbol: &str) -> Option<Order> {
        self.slots.remove(symbol)
    }

    /// Drain all outstanding orders (end of run).
    pub fn drain(&mut self) -> Vec<Order> {
        self.slots.drain().map(|(_, order)| order).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.slots.len()
    }
}
