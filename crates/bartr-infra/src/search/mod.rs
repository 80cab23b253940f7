//! Search index implementations.

mod memory;

pub use memory::InMemorySearchIndex;
