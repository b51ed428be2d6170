//! Core library for slipscan.
//!
//! This crate provides:
//! - A layered recovery pipeline that turns a vision model's free-text
//!   completion into a structured [`Invoice`]
//! - Bounded, cancellation-aware admission for concurrent scans
//! - The scan service tying upload, model call, parsing and storage together
//! - Receipt storage with spending analytics

pub mod error;
pub mod extraction;
pub mod models;
pub mod pool;
pub mod repository;
pub mod service;

pub use error::{ExtractionError, FailureKind, RepositoryError, Result, ScanError};
pub use extraction::{CompletionParser, DecodeStage, ExtractionResult, InvoiceParser};
pub use models::config::{ModelProvider, ScanConfig};
pub use models::invoice::{Category, Invoice, LineItem};
pub use models::receipt::{Receipt, ReceiptItem};
pub use pool::{AdmissionState, WorkerPool, WorkerSlot};
pub use repository::{InMemoryReceiptRepository, ReceiptRepository};
pub use service::ReceiptScanner;

/// Re-export collaborator types.
pub use slipscan_vision::{ImageStore, VisionError, VisionModel};

/// Re-export the cancellation signal accepted by scans.
pub use tokio_util::sync::CancellationToken;
