//! ossbridge Core Library
//!
//! Domain logic shared by every ossbridge surface: content-type resolution,
//! object-key construction, source identity resolution, object URL parsing,
//! the error taxonomy, and configuration.

pub mod backend;
pub mod clock;
pub mod config;
pub mod content_type;
pub mod error;
pub mod models;
pub mod object_key;
pub mod source;
pub mod url;

// Re-export commonly used types
pub use backend::Backend;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ToolsConfig;
pub use error::{ErrorMetadata, LogLevel, ToolError, ToolResult};
pub use models::{
    DirectoryMode, FilenameMode, ParsedObjectUrl, StorageCredentials, UploadRequest,
    UploadStatus,
};
pub use object_key::{ObjectKey, ObjectKeyBuilder};
pub use source::{ResolvedSource, SourceDescriptor, StreamSource, StructuredUpload};
pub use url::parse_object_url;
