//! Error types for the collaborator layer.

use thiserror::Error;

/// Failure of an upstream collaborator (object storage or vision model).
///
/// Every variant names the operation that failed so callers can report
/// which external call broke. Nothing in this crate retries.
#[derive(Error, Debug)]
pub enum VisionError {
    /// Required configuration (credentials, endpoints) is missing.
    #[error("{op}: {reason}")]
    Config { op: &'static str, reason: String },

    /// Transport-level failure: connect, TLS, timeout.
    #[error("{op}: {source}")]
    Http {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The collaborator answered with a non-success status.
    #[error("{op}: API error {status} - {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("{op}: {reason}")]
    Response { op: &'static str, reason: String },
}

impl VisionError {
    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        match self {
            VisionError::Config { op, .. }
            | VisionError::Http { op, .. }
            | VisionError::Status { op, .. }
            | VisionError::Response { op, .. } => op,
        }
    }

    /// Whether the failure is a missing-configuration problem rather than a
    /// runtime failure of the remote service.
    pub fn is_config(&self) -> bool {
        matches!(self, VisionError::Config { .. })
    }

    pub(crate) fn missing(reason: impl Into<String>) -> Self {
        VisionError::Config {
            op: "validate_configuration",
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_operation() {
        let err = VisionError::Status {
            op: "check_api_response",
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "check_api_response: API error 429 - rate limited");
        assert_eq!(err.op(), "check_api_response");
        assert!(!err.is_config());
    }

    #[test]
    fn test_missing_config() {
        let err = VisionError::missing("OpenRouter API key is not configured");
        assert!(err.is_config());
        assert_eq!(err.op(), "validate_configuration");
    }
}
