//! Image upload to Supabase storage.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use image::ImageFormat;
use reqwest::StatusCode;
use tracing::debug;

use crate::backend::ImageStore;
use crate::config::StorageConfig;
use crate::{Result, VisionError};

/// Uploads images to a Supabase bucket and hands back their public URL.
pub struct SupabaseStore {
    config: StorageConfig,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| VisionError::Http {
                op: "create_storage_client",
                source,
            })?;

        Ok(Self { config, client })
    }

    fn validate(&self) -> Result<()> {
        if self.config.url.is_empty() {
            return Err(VisionError::missing(
                "Supabase URL is not configured, set SUPABASE_URL",
            ));
        }
        if self.config.api_key.is_empty() {
            return Err(VisionError::missing(
                "Supabase API key is not configured, set SUPABASE_API_KEY",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for SupabaseStore {
    async fn upload(&self, image: &[u8], filename: &str, content_type: &str) -> Result<String> {
        self.validate()?;

        let url = self.config.object_url(filename);
        debug!("Uploading {} bytes to {}", image.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|source| VisionError::Http {
                op: "upload_image",
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                op: "upload_image",
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.config.public_url(filename))
    }
}

/// Pick an object name and content type for an image.
///
/// The format is sniffed from magic bytes; anything unrecognised is
/// uploaded as PNG.
pub fn object_name(image: &[u8]) -> (String, &'static str) {
    let (extension, content_type) = match image::guess_format(image) {
        Ok(ImageFormat::Jpeg) => ("jpg", "image/jpeg"),
        Ok(ImageFormat::WebP) => ("webp", "image/webp"),
        Ok(ImageFormat::Gif) => ("gif", "image/gif"),
        Ok(ImageFormat::Bmp) => ("bmp", "image/bmp"),
        Ok(ImageFormat::Tiff) => ("tiff", "image/tiff"),
        _ => ("png", "image/png"),
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    (format!("invoice_{}.{}", nanos, extension), content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_jpeg() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        let (name, content_type) = object_name(&jpeg);

        assert!(name.starts_with("invoice_"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(content_type, "image/jpeg");
    }

    #[test]
    fn test_object_name_unknown_falls_back_to_png() {
        let (name, content_type) = object_name(b"not an image");
        assert!(name.ends_with(".png"));
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_requires_credentials() {
        let store = SupabaseStore::new(StorageConfig::default()).unwrap();
        let err = store
            .upload(b"bytes", "invoice_1.png", "image/png")
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("SUPABASE_URL"));
    }
}
