//! Recovery of a structured invoice from a free-text model completion.
//!
//! Three decode stages are tried strictly in order, and the first one that
//! yields at least one usable field wins:
//!
//! 1. the whole completion decoded as a JSON invoice object,
//! 2. code fences stripped and the outermost `{...}` span decoded,
//! 3. every field recovered independently by pattern matching.
//!
//! All stages feed the same assembly step, which drops items without a
//! description, resolves categories and derives a missing `total_due`.

mod assemble;
mod parser;
mod payload;
pub mod rules;
mod stages;

pub use parser::{CompletionParser, DecodeStage, ExtractionResult, InvoiceParser};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
