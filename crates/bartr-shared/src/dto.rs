//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

use bartr_core::domain::{GeoPoint, Side, TradeState};

/// Body of `POST /api/trades/{trade_id}/close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseTradeRequest {
    pub side: Side,
}

/// Query for `GET /api/trades`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeListQuery {
    pub side: Side,
    pub state: TradeState,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub location: GeoPoint,
}

/// Query for `GET /api/posts/geo`. Typed deserialization rejects
/// non-numeric input before any handler code runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSearchQuery {
    pub lat: f64,
    pub lng: f64,
    /// Radius in meters.
    pub radius: f64,
}

/// Response for a stored post photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUploadResponse {
    pub url: String,
}
