//! Storage abstraction trait
//!
//! The tools only need four operations from a bucket. Keeping the interface
//! this narrow lets tests swap in an in-memory store or a failure-injecting
//! wrapper without touching the network.

use async_trait::async_trait;
use bytes::Bytes;
use ossbridge_core::ToolError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Failure reported by the backend. `code` is the S3-style error code
    /// (`AccessDenied`, `SignatureDoesNotMatch`, ...) when one was returned.
    #[error("{message}")]
    Backend {
        code: Option<String>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn backend(code: Option<String>, message: impl Into<String>) -> Self {
        StorageError::Backend {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable backend error code
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageError::NotFound(_) => Some("NoSuchKey"),
            StorageError::Backend { code, .. } => code.as_deref(),
            StorageError::Config(_) => None,
        }
    }

    /// Whether repeating the same request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Backend { .. })
    }
}

impl From<StorageError> for ToolError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Config(message) => ToolError::Validation(message),
            other => ToolError::StorageOperation {
                code: other.code().map(str::to_string),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Size and declared type of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_length: u64,
    pub content_type: Option<String>,
}

/// A single bucket on an S3-compatible backend
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Bucket this handle is bound to
    fn bucket(&self) -> &str;

    /// Endpoint host this handle talks to
    fn endpoint(&self) -> &str;

    /// One read-only request that succeeds only with working credentials
    async fn probe_bucket(&self) -> StorageResult<()>;

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    async fn head_object(&self, key: &str) -> StorageResult<ObjectMetadata>;

    async fn get_object(&self, key: &str) -> StorageResult<(Bytes, ObjectMetadata)>;
}
