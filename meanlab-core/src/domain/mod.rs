//! Domain types for MeanLab.

pub mod bar;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use order::{Order, OrderSide, OrderStatus};
pub use portfolio::Portfolio;
pub use position::Position;
pub use trade::TradeRecord;

/// Symbol type alias
pub type Symbol = String;
