//! Broker arithmetic: apply order fills to the portfolio.
//!
//! Fills happen at the bar's open price. A buy whose cost plus commission
//! exceeds available cash is rejected at fill time (margin rejection), which
//! matches submitting against cash that moved since the order was sized.

use chrono::NaiveDate;

use crate::domain::{Order, Portfolio, Position, TradeRecord};

/// What happened when an order met the open price.
#[derive(Debug, Clone)]
pub enum FillOutcome {
    /// Buy filled; position opened.
    Opened,
    /// Close filled; round trip complete.
    Closed(TradeRecord),
    /// Cost plus commission exceeded cash; portfolio untouched.
    MarginRejected,
}

/// Fill a buy order at `price`, debiting cash and opening the position.
pub fn fill_buy(
    portfolio: &mut Portfolio,
    order: &Order,
    price: f64,
    date: NaiveDate,
    bar_index: usize,
    commission_rate: f64,
) -> FillOutcome {
    let cost = order.quantity as f64 * price;
    let commission = cost * commission_rate;
    if cost + commission > portfolio.cash {
        return FillOutcome::MarginRejected;
    }

    portfolio.cash -= cost + commission;
    portfolio.total_commission += commission;
    portfolio.positions.insert(
        order.symbol.clone(),
        Position {
            symbol: order.symbol.clone(),
            quantity: order.quantity,
            avg_entry_price: price,
            entry_bar: bar_index,
            entry_date: date,
            entry_commission: commission,
        },
    );
    FillOutcome::Opened
}

/// Fill a liquidation at `price`, crediting cash and emitting the trade record.
///
/// Returns `None` if the symbol has no open position (nothing to close).
pub fn fill_close(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    bar_index: usize,
    commission_rate: f64,
) -> Option<TradeRecord> {
    let position = portfolio.positions.remove(symbol)?;

    let proceeds = position.quantity as f64 * price;
    let commission = proceeds * commission_rate;
    portfolio.cash += proceeds - commission;
    portfolio.total_commission += commission;

    let gross_pnl = position.quantity as f64 * (price - position.avg_entry_price);
    let total_commission = position.entry_commission + commission;

    Some(TradeRecord {
        symbol: symbol.to_string(),
        entry_bar: position.entry_bar,
        entry_date: position.entry_date,
        entry_price: position.avg_entry_price,
        exit_bar: bar_index,
        exit_date: date,
        exit_price: price,
        quantity: position.quantity,
        gross_pnl,
        commission: total_commission,
        net_pnl: gross_pnl - total_commission,
        bars_held: bar_index.saturating_sub(position.entry_bar),
    })
}
