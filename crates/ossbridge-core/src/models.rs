//! Request-scoped value types shared by the tool pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::backend::Backend;

/// Default number of write attempts per file
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Whether a date-derived segment is injected between the directory and the filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectoryMode {
    #[default]
    #[serde(rename = "no_subdirectory")]
    None,
    /// `dir/2025/09/10/file`
    #[serde(rename = "yyyy_mm_dd_hierarchy")]
    YyyyMmDdHierarchy,
    /// `dir/20250910/file`
    #[serde(rename = "yyyy_mm_dd_combined")]
    YyyyMmDdCombined,
}

/// How the final filename is derived from the resolved one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilenameMode {
    #[default]
    #[serde(rename = "filename")]
    AsGiven,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "filename_timestamp")]
    Timestamped,
}

/// Per-call upload options. The source descriptor travels separately because
/// streams are not `Clone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub directory: Option<String>,
    pub directory_mode: DirectoryMode,
    pub filename: Option<String>,
    pub filename_mode: FilenameMode,
    pub max_retries: u32,
}

impl Default for UploadRequest {
    fn default() -> Self {
        Self {
            directory: None,
            directory_mode: DirectoryMode::default(),
            filename: None,
            filename_mode: FilenameMode::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Failed,
}

fn default_true() -> bool {
    true
}

/// Storage credentials supplied by the host for a single call. Never persisted.
///
/// Missing fields deserialize as empty strings so the credential validator can
/// report which one is absent.
#[derive(Clone, Deserialize)]
pub struct StorageCredentials {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub access_key_secret: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_true")]
    pub enable_verify_ssl: bool,
    #[serde(default = "default_true")]
    pub use_https: bool,
    /// Request timeout handed to the storage client, in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Provider-level default directory; only checked for format
    #[serde(default)]
    pub directory: Option<String>,
    /// Provider-level default filename; only checked for format
    #[serde(default)]
    pub filename: Option<String>,
}

impl Default for StorageCredentials {
    fn default() -> Self {
        Self::new(Backend::default(), "", "", "", "")
    }
}

impl StorageCredentials {
    pub fn new(
        backend: Backend,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            region: None,
            enable_verify_ssl: true,
            use_https: true,
            request_timeout_secs: None,
            directory: None,
            filename: None,
        }
    }

    /// URL scheme used for public object URLs and client connections
    pub fn scheme(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// Endpoint host without scheme or trailing slash
    pub fn endpoint_host(&self) -> &str {
        endpoint_host(&self.endpoint)
    }

    /// Configured region, or the one derived from the endpoint
    pub fn resolved_region(&self) -> String {
        self.region
            .clone()
            .filter(|r| !r.trim().is_empty())
            .or_else(|| self.backend.region_from_endpoint(&self.endpoint))
            .unwrap_or_default()
    }

    /// Same credentials pointed at another bucket/endpoint (download by URL)
    pub fn retarget(&self, bucket: &str, endpoint: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            endpoint: endpoint.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("region", &self.region)
            .field("enable_verify_ssl", &self.enable_verify_ssl)
            .field("use_https", &self.use_https)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Strip the scheme and trailing slashes from an endpoint
pub fn endpoint_host(endpoint: &str) -> &str {
    endpoint
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

/// Bucket, endpoint and key recovered from a virtual-hosted-style URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedObjectUrl {
    pub bucket: String,
    pub endpoint: String,
    pub object_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_use_host_wire_names() {
        let mode: DirectoryMode = serde_json::from_str("\"yyyy_mm_dd_combined\"").unwrap();
        assert_eq!(mode, DirectoryMode::YyyyMmDdCombined);
        let mode: FilenameMode = serde_json::from_str("\"filename_timestamp\"").unwrap();
        assert_eq!(mode, FilenameMode::Timestamped);
        assert_eq!(
            serde_json::to_string(&DirectoryMode::None).unwrap(),
            "\"no_subdirectory\""
        );
    }

    #[test]
    fn credentials_defaults_from_json() {
        let creds: StorageCredentials = serde_json::from_value(serde_json::json!({
            "endpoint": "https://tos-cn-beijing.volces.com/",
            "bucket": "media"
        }))
        .unwrap();
        assert!(creds.use_https);
        assert!(creds.enable_verify_ssl);
        assert!(creds.access_key_id.is_empty());
        assert_eq!(creds.endpoint_host(), "tos-cn-beijing.volces.com");
        assert_eq!(creds.resolved_region(), "cn-beijing");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = StorageCredentials::new(Backend::AliyunOss, "e", "b", "id", "super-secret");
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }

    #[test]
    fn http_scheme_when_https_disabled() {
        let mut creds = StorageCredentials::new(Backend::AliyunOss, "e", "b", "id", "s");
        creds.use_https = false;
        assert_eq!(creds.scheme(), "http");
    }
}
