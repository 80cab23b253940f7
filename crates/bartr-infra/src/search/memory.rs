//! In-memory geo index - used as fallback when no hosted search service
//! is configured. Radius queries do a linear haversine scan, which is fine
//! at this scale.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bartr_core::domain::Post;
use bartr_core::ports::{GeoQuery, SearchError, SearchIndex};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters.
fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

pub struct InMemorySearchIndex {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn index_post(&self, post: &Post) -> Result<(), SearchError> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn remove_post(&self, post_id: Uuid) -> Result<(), SearchError> {
        self.posts.write().await.remove(&post_id);
        Ok(())
    }

    async fn search_radius(&self, query: GeoQuery) -> Result<Vec<Post>, SearchError> {
        let posts = self.posts.read().await;
        Ok(posts
            .values()
            .filter(|p| {
                haversine_m(query.lat, query.lng, p.location.lat, p.location.lng)
                    <= query.radius_m
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bartr_core::domain::GeoPoint;

    fn post_at(lat: f64, lng: f64) -> Post {
        Post::new(
            Uuid::new_v4(),
            "Lamp".to_string(),
            "Works".to_string(),
            vec![],
            GeoPoint { lat, lng },
        )
    }

    #[test]
    fn haversine_is_sane() {
        // One degree of latitude is ~111 km.
        let d = haversine_m(45.0, -73.0, 46.0, -73.0);
        assert!((d - 111_000.0).abs() < 500.0, "got {d}");
        assert_eq!(haversine_m(45.0, -73.0, 45.0, -73.0), 0.0);
    }

    #[tokio::test]
    async fn radius_query_filters_by_distance() {
        let index = InMemorySearchIndex::new();
        let near = post_at(45.50, -73.60);
        let far = post_at(46.50, -73.60); // ~111 km north
        index.index_post(&near).await.unwrap();
        index.index_post(&far).await.unwrap();

        let hits = index
            .search_radius(GeoQuery {
                lat: 45.51,
                lng: -73.60,
                radius_m: 5_000.0,
            })
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, near.id);
    }

    #[tokio::test]
    async fn removed_posts_stop_matching() {
        let index = InMemorySearchIndex::new();
        let post = post_at(10.0, 10.0);
        index.index_post(&post).await.unwrap();
        index.remove_post(post.id).await.unwrap();

        let hits = index
            .search_radius(GeoQuery {
                lat: 10.0,
                lng: 10.0,
                radius_m: 1_000.0,
            })
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
