//! Error types module
//!
//! Every failure a tool can report is a [`ToolError`]. Variants self-describe
//! through [`ErrorMetadata`] so surfaces (MCP, CLI) can decide how to log and
//! whether a failure is worth retrying without matching on variants.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors such as bad parameters
    Debug,
    /// Rejected credentials and other recoverable operator mistakes
    Warn,
    /// Storage failures
    Error,
}

/// Metadata for error reporting
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the failed operation may succeed when attempted again
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Missing or malformed caller-supplied field. Never retried.
    #[error("{0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedSource(String),

    #[error("Invalid object URL format: {0}")]
    InvalidUrlFormat(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("{message}")]
    CredentialValidation {
        code: Option<String>,
        message: String,
    },

    #[error("{message}")]
    StorageOperation {
        code: Option<String>,
        message: String,
    },
}

/// Result alias used across the tool pipeline
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    pub fn storage(code: Option<String>, message: impl Into<String>) -> Self {
        ToolError::StorageOperation {
            code,
            message: message.into(),
        }
    }

    /// Backend error code, when the backend reported one
    pub fn code(&self) -> Option<&str> {
        match self {
            ToolError::CredentialValidation { code, .. }
            | ToolError::StorageOperation { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<io::Error> for ToolError {
    fn from(err: io::Error) -> Self {
        ToolError::UnsupportedSource(format!("IO error: {}", err))
    }
}

impl ErrorMetadata for ToolError {
    fn error_code(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "VALIDATION_ERROR",
            ToolError::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
            ToolError::InvalidUrlFormat(_) => "INVALID_URL_FORMAT",
            ToolError::MissingCredential(_) => "MISSING_CREDENTIAL",
            ToolError::CredentialValidation { .. } => "CREDENTIAL_VALIDATION_ERROR",
            ToolError::StorageOperation { .. } => "STORAGE_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, ToolError::StorageOperation { .. })
    }

    fn log_level(&self) -> LogLevel {
        match self {
            ToolError::Validation(_)
            | ToolError::UnsupportedSource(_)
            | ToolError::InvalidUrlFormat(_) => LogLevel::Debug,
            ToolError::MissingCredential(_) | ToolError::CredentialValidation { .. } => {
                LogLevel::Warn
            }
            ToolError::StorageOperation { .. } => LogLevel::Error,
        }
    }
}
