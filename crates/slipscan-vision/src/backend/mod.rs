//! Collaborator traits and their HTTP implementations.

pub mod mlx;
pub mod openrouter;

use async_trait::async_trait;

use crate::Result;

/// Object storage that makes an uploaded image reachable by URL.
///
/// Implementations must be shareable across concurrent scans.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload an image and return its public URL.
    ///
    /// # Arguments
    /// * `image` - Raw image bytes, opaque to the store
    /// * `filename` - Object name inside the bucket
    /// * `content_type` - MIME type sent with the upload
    async fn upload(&self, image: &[u8], filename: &str, content_type: &str) -> Result<String>;
}

/// A vision-capable language model.
///
/// The model is pointed at an image URL and answers with free text that is
/// expected, but not guaranteed, to be the invoice JSON.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Ask the model to extract invoice data from the image at `image_url`.
    async fn complete(&self, image_url: &str) -> Result<String>;
}
