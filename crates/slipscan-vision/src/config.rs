//! Connection settings for the collaborators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OpenRouter chat-completions settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// Chat completions endpoint.
    pub api_url: String,

    /// Bearer token. Empty means "not configured".
    pub api_key: String,

    /// Vision-capable model identifier.
    pub model_id: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Value sent as `HTTP-Referer`.
    pub referer: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            api_key: String::new(),
            model_id: "meta-llama/llama-3.2-11b-vision-instruct:free".to_string(),
            timeout_secs: 60,
            referer: "https://github.com/example/slipscan".to_string(),
        }
    }
}

impl OpenRouterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Self-hosted MLX-VLM extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlxConfig {
    /// Service base URL, without the `/extract` suffix.
    pub base_url: String,

    /// Request timeout in seconds. Local models are slow.
    pub timeout_secs: u64,
}

impl Default for MlxConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl MlxConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Supabase storage bucket used to publish uploaded images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`.
    pub url: String,

    /// Bucket name.
    pub bucket: String,

    /// Service key used as bearer token.
    pub api_key: String,

    /// Upload timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            bucket: "invoices".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Upload endpoint for an object.
    pub fn object_url(&self, filename: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base(), self.bucket, filename)
    }

    /// Public URL of an uploaded object.
    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base(),
            self.bucket,
            filename
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_urls() {
        let config = StorageConfig {
            url: "https://abc.supabase.co/".to_string(),
            ..StorageConfig::default()
        };

        assert_eq!(
            config.object_url("invoice_1.png"),
            "https://abc.supabase.co/storage/v1/object/invoices/invoice_1.png"
        );
        assert_eq!(
            config.public_url("invoice_1.png"),
            "https://abc.supabase.co/storage/v1/object/public/invoices/invoice_1.png"
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: OpenRouterConfig = serde_json::from_str(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.api_url.ends_with("/chat/completions"));
    }
}
