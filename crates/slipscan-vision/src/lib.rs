//! External collaborators for slipscan.
//!
//! This crate hides the two network dependencies of a receipt scan behind
//! traits so the core pipeline never talks HTTP directly:
//! - [`ImageStore`]: uploads the image and returns a public URL
//! - [`VisionModel`]: sends that URL to a vision model and returns its completion text

mod backend;
mod config;
mod envelope;
mod error;
mod prompt;
mod storage;

pub use backend::{ImageStore, VisionModel};
pub use backend::mlx::MlxModel;
pub use backend::openrouter::OpenRouterModel;
pub use config::{MlxConfig, OpenRouterConfig, StorageConfig};
pub use envelope::parse_chat_completion;
pub use error::VisionError;
pub use prompt::{EXTRACTION_PROMPT, USER_INSTRUCTION};
pub use storage::{SupabaseStore, object_name};

/// Result type for collaborator operations.
pub type Result<T> = std::result::Result<T, VisionError>;
