//! Error types for the approval library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for approval workflow operations.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// A batch or snapshot could not be turned into a decision queue.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// A decision was submitted for an item other than the current one.
    #[error("Out-of-order decision: expected '{expected}', received '{received}'")]
    OutOfOrderDecision { expected: String, received: String },

    /// A decision was submitted after every item was decided.
    #[error("Queue exhausted: every item already has a decision")]
    QueueExhausted,

    /// A terminal-only operation was called before the queue finished.
    #[error("Queue not complete: {decided} of {total} items decided")]
    QueueNotComplete { decided: usize, total: usize },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a request file.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Scoring model error (missing feature, bad model file, ...).
    #[error("Model error: {0}")]
    Model(String),

    /// Error saving or loading workflow state.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ApprovalError {
    /// Whether the caller can recover by re-reading queue state and retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApprovalError::OutOfOrderDecision { .. }
                | ApprovalError::QueueExhausted
                | ApprovalError::QueueNotComplete { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ApprovalError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for approval operations.
pub type Result<T> = std::result::Result<T, ApprovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_errors_are_recoverable() {
        assert!(ApprovalError::QueueExhausted.is_recoverable());
        assert!(
            ApprovalError::OutOfOrderDecision {
                expected: "A".to_string(),
                received: "B".to_string(),
            }
            .is_recoverable()
        );
        assert!(!ApprovalError::InvalidBatch("empty".to_string()).is_recoverable());
    }

    #[test]
    fn test_out_of_order_message() {
        let err = ApprovalError::OutOfOrderDecision {
            expected: "INV-1001".to_string(),
            received: "INV-2002".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Out-of-order decision: expected 'INV-1001', received 'INV-2002'"
        );
    }
}
