//! Error types for the counselor
//!
//! Script and configuration problems are rejected when they are loaded, so a
//! running conversation never surfaces them.

use thiserror::Error;

/// Result type alias for counselor operations
pub type Result<T> = std::result::Result<T, CounselorError>;

/// Counselor error types
#[derive(Debug, Error)]
pub enum CounselorError {
    /// A rule pattern failed to compile
    #[error("Invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern source
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// A template references a capture group its pattern does not define
    #[error("Template `{template}` references unknown capture group `{group}`")]
    UnknownCaptureGroup {
        /// The offending template
        template: String,
        /// The missing group name
        group: String,
    },

    /// The script is structurally invalid
    #[error("Invalid script: {0}")]
    InvalidScript(String),

    /// Configuration value out of range or unparsable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No session registered under the given id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Malformed host request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl CounselorError {
    /// Whether the error stems from authored script content.
    pub fn is_script_error(&self) -> bool {
        matches!(
            self,
            CounselorError::InvalidPattern { .. }
                | CounselorError::UnknownCaptureGroup { .. }
                | CounselorError::InvalidScript(_)
        )
    }
}

impl From<serde_json::Error> for CounselorError {
    fn from(err: serde_json::Error) -> Self {
        CounselorError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CounselorError {
    fn from(err: std::io::Error) -> Self {
        CounselorError::Io(err.to_string())
    }
}
