//! Ordered multi-stage completion parser.

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use super::Result;
use super::assemble::assemble;
use super::stages::{StageFn, decode_embedded, decode_structured, recover_fields};
use crate::error::ExtractionError;
use crate::models::invoice::Invoice;

/// Which decode stage produced the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStage {
    /// The completion was itself a JSON invoice.
    Structured,
    /// JSON found inside fences or prose.
    Embedded,
    /// Fields recovered one by one from malformed output.
    FieldRecovery,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DecodeStage::Structured => "structured",
            DecodeStage::Embedded => "embedded",
            DecodeStage::FieldRecovery => "field_recovery",
        })
    }
}

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: Invoice,
    /// Stage that produced the invoice.
    pub stage: DecodeStage,
    /// The completion text that was parsed.
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser: Send + Sync {
    /// Parse an invoice from a model completion.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

const STAGES: [(DecodeStage, StageFn); 3] = [
    (DecodeStage::Structured, decode_structured),
    (DecodeStage::Embedded, decode_embedded),
    (DecodeStage::FieldRecovery, recover_fields),
];

/// Parser that tries each decode stage in turn and keeps the first one
/// that recovers anything.
///
/// Stateless; one instance can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionParser;

impl CompletionParser {
    pub fn new() -> Self {
        Self
    }
}

impl InvoiceParser for CompletionParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        for (stage, decode) in STAGES {
            match decode(text).and_then(assemble) {
                Ok((invoice, warnings)) => {
                    let processing_time_ms = start.elapsed().as_millis() as u64;
                    info!(
                        "Parsed invoice via {} stage: {} items, total due {}",
                        stage,
                        invoice.items.len(),
                        invoice.total_due
                    );

                    return Ok(ExtractionResult {
                        invoice,
                        stage,
                        raw_text: text.to_string(),
                        warnings,
                        processing_time_ms,
                    });
                }
                Err(e) => debug!("{} stage failed: {}", stage, e),
            }
        }

        Err(ExtractionError::NoData)
    }
}
