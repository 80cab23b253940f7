//! Filesystem object store. Images land under `{root}/posts/{post_id}/`
//! and are served from `{base_url}` by whatever fronts the media root.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use bartr_core::ports::{image_extension_allowed, ObjectStore, ObjectStoreError};

pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

fn io_err(e: std::io::Error) -> ObjectStoreError {
    ObjectStoreError::Io(e.to_string())
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put_post_image(
        &self,
        post_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        if !image_extension_allowed(filename) {
            return Err(ObjectStoreError::InvalidImageType(filename.to_string()));
        }
        // Reject path separators smuggled into the filename.
        if filename.contains('/') || filename.contains("..") {
            return Err(ObjectStoreError::InvalidImageType(filename.to_string()));
        }

        let dir = self.root.join("posts").join(post_id.to_string());
        tokio::fs::create_dir_all(&dir).await.map_err(io_err)?;
        tokio::fs::write(dir.join(filename), bytes)
            .await
            .map_err(io_err)?;

        Ok(format!("{}/posts/{}/{}", self.base_url, post_id, filename))
    }

    async fn delete_post_images(&self, post_id: Uuid) -> Result<(), ObjectStoreError> {
        let dir = self.root.join("posts").join(post_id.to_string());
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(e)),
        }
    }
}
