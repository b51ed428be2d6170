//! Self-hosted MLX-VLM backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tracing::debug;

use crate::config::MlxConfig;
use crate::{Result, VisionError, VisionModel};

/// Vision model served by a local MLX-VLM `/extract` endpoint.
///
/// The service already answers with the invoice JSON, so the whole body is
/// returned as the completion.
pub struct MlxModel {
    config: MlxConfig,
    client: reqwest::Client,
}

impl MlxModel {
    pub fn new(config: MlxConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| VisionError::Http {
                op: "create_model_client",
                source,
            })?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check that the service is up.
    pub async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|source| VisionError::Http {
                op: "health_check",
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Status {
                op: "health_check",
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl VisionModel for MlxModel {
    fn name(&self) -> &str {
        "mlx-vlm"
    }

    async fn complete(&self, image_url: &str) -> Result<String> {
        if self.config.base_url.is_empty() {
            return Err(VisionError::missing(
                "MLX service URL is not configured, set MLX_SERVICE_URL",
            ));
        }

        let url = self.endpoint("extract");
        debug!("Sending extraction request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "image_url": image_url }))
            .send()
            .await
            .map_err(|source| VisionError::Http {
                op: "send_extract_request",
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| VisionError::Http {
            op: "read_response",
            source,
        })?;

        if status != StatusCode::OK {
            return Err(VisionError::Status {
                op: "check_api_response",
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_slash() {
        let model = MlxModel::new(MlxConfig {
            base_url: "http://mlx:8000/".to_string(),
            ..MlxConfig::default()
        })
        .unwrap();

        assert_eq!(model.endpoint("extract"), "http://mlx:8000/extract");
    }

    #[tokio::test]
    async fn test_missing_base_url() {
        let model = MlxModel::new(MlxConfig {
            base_url: String::new(),
            ..MlxConfig::default()
        })
        .unwrap();

        let err = model.complete("https://img/1.png").await.unwrap_err();
        assert!(err.is_config());
    }
}
