//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod media;
mod search;
mod store;

pub use auth::{AuthError, Principal, TokenVerifier};
pub use media::{image_extension_allowed, ObjectStore, ObjectStoreError, ALLOWED_IMAGE_EXTENSIONS};
pub use search::{GeoQuery, SearchError, SearchIndex};
pub use store::{CloseUpdate, TradeStore};
