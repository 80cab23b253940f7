//! Trade store implementations.

mod memory;
mod transition;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub mod entity;

pub use memory::MemoryTradeStore;

#[cfg(feature = "postgres")]
pub use postgres::{DatabaseConfig, PostgresTradeStore};

#[cfg(test)]
mod tests;
