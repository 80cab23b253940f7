//! Domain entities - posts, trades, and their lifecycle states.

mod post;
mod trade;

pub use post::{GeoPoint, Post, PostState};
pub use trade::{Side, Trade, TradeSide, TradeState};
