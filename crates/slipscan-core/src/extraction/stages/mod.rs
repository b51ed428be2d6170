//! The ordered decode stages.
//!
//! Each stage is a pure function from completion text to a draft. A stage
//! failure is an ordinary value: the parser logs it and moves on.

mod embedded;
mod recovery;
mod structured;

use thiserror::Error;

use super::assemble::InvoiceDraft;

pub(crate) use embedded::decode_embedded;
pub(crate) use recovery::recover_fields;
pub(crate) use structured::decode_structured;

/// Why a single stage produced nothing.
#[derive(Error, Debug)]
pub(crate) enum StageError {
    #[error("invalid invoice JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("top-level JSON value is not an object")]
    NotAnObject,

    #[error("no JSON object in text")]
    NoJsonObject,

    #[error("no invoice fields recovered")]
    NoFields,
}

pub(crate) type StageFn = fn(&str) -> Result<InvoiceDraft, StageError>;
