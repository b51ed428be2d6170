//! Configuration for the scan service.

use serde::{Deserialize, Serialize};
use slipscan_vision::{MlxConfig, OpenRouterConfig, StorageConfig};

use crate::pool::DEFAULT_MAX_WORKERS;

/// Main configuration for slipscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker pool configuration.
    pub pool: PoolConfig,

    /// Vision model configuration.
    pub model: ModelConfig,

    /// Image storage configuration.
    pub storage: StorageConfig,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of scans in flight. 0 means the default.
    pub max_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Which vision backend to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    #[default]
    OpenRouter,
    Mlx,
}

/// Vision model configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub open_router: OpenRouterConfig,
    pub mlx: MlxConfig,
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Unset or empty variables leave the current value alone, as do
    /// numbers that fail to parse.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MAX_WORKERS") {
            set_parsed(&mut self.pool.max_workers, "MAX_WORKERS", &v);
        }

        if let Some(v) = get("OPENROUTER_API_KEY") {
            self.model.open_router.api_key = v;
        }
        if let Some(v) = get("OPENROUTER_MODEL_ID") {
            self.model.open_router.model_id = v;
        }
        if let Some(v) = get("OPENROUTER_TIMEOUT") {
            set_parsed(&mut self.model.open_router.timeout_secs, "OPENROUTER_TIMEOUT", &v);
        }

        if let Some(v) = get("SUPABASE_URL") {
            self.storage.url = v;
        }
        if let Some(v) = get("SUPABASE_API_KEY") {
            self.storage.api_key = v;
        }
        if let Some(v) = get("SUPABASE_BUCKET") {
            self.storage.bucket = v;
        }

        if let Some(v) = get("USE_MLX_SERVICE") {
            self.model.provider = if v.trim().eq_ignore_ascii_case("true") {
                ModelProvider::Mlx
            } else {
                ModelProvider::OpenRouter
            };
        }
        if let Some(v) = get("MLX_SERVICE_URL") {
            self.model.mlx.base_url = v;
        }
        if let Some(v) = get("MLX_TIMEOUT") {
            set_parsed(&mut self.model.mlx.timeout_secs, "MLX_TIMEOUT", &v);
        }

        self.normalize();
    }

    /// Replace out-of-range values with defaults.
    pub fn normalize(&mut self) {
        if self.pool.max_workers == 0 {
            self.pool.max_workers = DEFAULT_MAX_WORKERS;
        }
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, key: &str, value: &str) {
    match value.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::warn!("Ignoring malformed {}={:?}", key, value),
    }
}
