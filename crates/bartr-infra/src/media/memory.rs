//! In-memory object store - used as fallback and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bartr_core::ports::{image_extension_allowed, ObjectStore, ObjectStoreError};

/// In-memory object store keyed by `posts/{post_id}/{filename}`.
///
/// Note: objects are lost on process restart.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    base_url: String,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_post_image(
        &self,
        post_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        if !image_extension_allowed(filename) {
            return Err(ObjectStoreError::InvalidImageType(filename.to_string()));
        }

        let key = format!("posts/{}/{}", post_id, filename);
        let url = format!("{}/{}", self.base_url, key);
        self.objects.write().await.insert(key, bytes);
        Ok(url)
    }

    async fn delete_post_images(&self, post_id: Uuid) -> Result<(), ObjectStoreError> {
        let prefix = format!("posts/{}/", post_id);
        let mut objects = self.objects.write().await;
        objects.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_returns_a_url() {
        let store = InMemoryObjectStore::new("http://media.local");
        let post_id = Uuid::new_v4();

        let url = store
            .put_post_image(post_id, "front.jpg", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(url, format!("http://media.local/posts/{}/front.jpg", post_id));
        assert_eq!(store.object_count().await, 1);
    }

    #[tokio::test]
    async fn rejects_disallowed_extension() {
        let store = InMemoryObjectStore::new("http://media.local");
        let result = store
            .put_post_image(Uuid::new_v4(), "shady.exe", vec![])
            .await;
        assert!(matches!(result, Err(ObjectStoreError::InvalidImageType(_))));
        assert_eq!(store.object_count().await, 0);
    }

    #[tokio::test]
    async fn prefix_delete_only_touches_the_post() {
        let store = InMemoryObjectStore::new("http://media.local");
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.put_post_image(a, "one.png", vec![]).await.unwrap();
        store.put_post_image(a, "two.png", vec![]).await.unwrap();
        store.put_post_image(b, "keep.png", vec![]).await.unwrap();

        store.delete_post_images(a).await.unwrap();
        assert_eq!(store.object_count().await, 1);
    }
}
