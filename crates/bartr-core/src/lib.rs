//! # Bartr Core
//!
//! The domain layer of the Bartr exchange-settlement backend.
//! This crate contains the trade-closing protocol and the port traits it
//! depends on, with zero infrastructure dependencies.

pub mod closer;
pub mod domain;
pub mod error;
pub mod ports;

pub use closer::TradeCloser;
pub use error::{StoreError, TradeError};
