//! Binary object store port for post images.

use async_trait::async_trait;
use uuid::Uuid;

/// Image extensions the store accepts.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Case-insensitive extension check against the allow list.
pub fn image_extension_allowed(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an image under the post's prefix and return a stable
    /// retrieval URL. Rejects filenames outside the extension allow list.
    async fn put_post_image(
        &self,
        post_id: Uuid,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError>;

    /// Remove everything stored under the post's prefix.
    async fn delete_post_images(&self, post_id: Uuid) -> Result<(), ObjectStoreError>;
}

/// Object store errors.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("File: {0} is an invalid image type")]
    InvalidImageType(String),

    #[error("Object store I/O failed: {0}")]
    Io(String),
}
