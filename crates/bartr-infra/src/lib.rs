//! # Bartr Infrastructure
//!
//! Concrete implementations of the ports defined in `bartr-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL trade store via SeaORM
//! - `auth` - JWT bearer-token verification

pub mod media;
pub mod search;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use media::InMemoryObjectStore;
pub use search::InMemorySearchIndex;
pub use store::MemoryTradeStore;

// Re-exports - Filesystem media
pub use media::FsObjectStore;

#[cfg(feature = "auth")]
pub use auth::{JwtTokenVerifier, JwtVerifierConfig};

#[cfg(feature = "postgres")]
pub use store::{DatabaseConfig, PostgresTradeStore};
