use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a post. A post is PENDING while it is open for
/// trading and CLOSED once its side of a trade has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostState {
    Pending,
    Closed,
}

impl PostState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostState::Pending => "PENDING",
            PostState::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(PostState::Pending),
            "CLOSED" => Some(PostState::Closed),
            _ => None,
        }
    }
}

/// A latitude/longitude pair attached to every post.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Post entity - an offer of a good or service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub photo_urls: Vec<String>,
    pub tags: Vec<String>,
    pub state: PostState,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new PENDING post with no photos yet.
    pub fn new(
        user_id: Uuid,
        title: String,
        description: String,
        tags: Vec<String>,
        location: GeoPoint,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            photo_urls: Vec::new(),
            tags,
            state: PostState::Pending,
            location,
            created_at: now,
            updated_at: now,
        }
    }
}
