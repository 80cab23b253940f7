//! SeaORM entities for the trade store.

pub mod post;
pub mod trade;
