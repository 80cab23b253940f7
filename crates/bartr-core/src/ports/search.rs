//! Geo search index port.
//!
//! The closing protocol never touches the index; only the HTTP surface
//! does, for post indexing and radius queries.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Post;

/// A radius query around a point. Radius is in meters.
#[derive(Debug, Clone, Copy)]
pub struct GeoQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Add or refresh a post in the index.
    async fn index_post(&self, post: &Post) -> Result<(), SearchError>;

    async fn remove_post(&self, post_id: Uuid) -> Result<(), SearchError>;

    /// Posts whose location falls within the query radius.
    async fn search_radius(&self, query: GeoQuery) -> Result<Vec<Post>, SearchError>;
}

/// Search index errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index operation failed: {0}")]
    Index(String),

    #[error("Search query failed: {0}")]
    Query(String),
}
