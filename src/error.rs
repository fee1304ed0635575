//! Error handling for task record processing.
//!
//! Provides error types with line and path context for record parsing,
//! script execution and verification script generation failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task source unavailable: {path} - {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Read failed near line {line}: {source}")]
    SourceRead {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record starting line {line}: expected 7 fields, found {found}")]
    MalformedRecord {
        line: usize,
        found: usize,
        preview: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Execution failed for record {record_id}: {message}")]
    Execution { record_id: String, message: String },

    #[error("Result type not recognized: {kind}")]
    UnrecognizedResult { kind: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Only {processed} of {submitted} submitted records were processed")]
    Incomplete { processed: usize, submitted: usize },

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Processing cancelled by user")]
    Cancelled,
}

impl TaskError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an execution error for a record
    pub fn execution(record_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            record_id: record_id.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let malformed = TaskError::MalformedRecord {
            line: 12,
            found: 4,
            preview: String::new(),
        };
        assert_eq!(
            malformed.to_string(),
            "Malformed record starting line 12: expected 7 fields, found 4"
        );

        let exec = TaskError::execution("42", "connection refused");
        assert_eq!(
            exec.to_string(),
            "Execution failed for record 42: connection refused"
        );
    }
}
