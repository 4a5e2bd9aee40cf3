//! MCP tool request types with JSON Schema for parameter generation

use schemars::JsonSchema;
use serde::Deserialize;

use ossbridge_core::{Backend, StorageCredentials, ToolError, ToolResult};

/// Per-call credential overrides. Empty fields fall back to the server's
/// configured credentials.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CredentialsParam {
    #[schemars(description = "Backend: aliyun_oss or volcengine_tos")]
    pub backend: Option<String>,
    #[schemars(description = "Endpoint host, e.g. oss-cn-hangzhou.aliyuncs.com")]
    pub endpoint: Option<String>,
    #[schemars(description = "Bucket name")]
    pub bucket: Option<String>,
    #[schemars(description = "Access key ID")]
    pub access_key_id: Option<String>,
    #[schemars(description = "Access key secret")]
    pub access_key_secret: Option<String>,
    #[schemars(description = "Region; derived from the endpoint when omitted")]
    pub region: Option<String>,
    #[schemars(description = "Verify TLS certificates (default true)")]
    pub enable_verify_ssl: Option<bool>,
    #[schemars(description = "Use https for requests and returned URLs (default true)")]
    pub use_https: Option<bool>,
}

fn set_if_present(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *target = value;
    }
}

impl CredentialsParam {
    /// Overlay these overrides on `base`
    pub fn apply(self, base: &StorageCredentials) -> ToolResult<StorageCredentials> {
        let mut credentials = base.clone();
        if let Some(backend) = self.backend.filter(|b| !b.trim().is_empty()) {
            credentials.backend = backend
                .parse::<Backend>()
                .map_err(|e| ToolError::validation(e.to_string()))?;
        }
        set_if_present(&mut credentials.endpoint, self.endpoint);
        set_if_present(&mut credentials.bucket, self.bucket);
        set_if_present(&mut credentials.access_key_id, self.access_key_id);
        set_if_present(&mut credentials.access_key_secret, self.access_key_secret);
        if let Some(region) = self.region.filter(|r| !r.trim().is_empty()) {
            credentials.region = Some(region);
        }
        if let Some(verify) = self.enable_verify_ssl {
            credentials.enable_verify_ssl = verify;
        }
        if let Some(https) = self.use_https {
            credentials.use_https = https;
        }
        Ok(credentials)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UploadFileRequest {
    #[schemars(
        description = "File to upload: a local path string, an object {blob (base64), filename?, mime_type?}, or {bytes (base64)}"
    )]
    pub file: serde_json::Value,
    #[schemars(description = "Target directory inside the bucket; empty for the root")]
    pub directory: Option<String>,
    #[schemars(
        description = "Date subdirectory: no_subdirectory, yyyy_mm_dd_hierarchy or yyyy_mm_dd_combined"
    )]
    pub directory_mode: Option<String>,
    #[schemars(description = "Filename to store the file under")]
    pub filename: Option<String>,
    #[schemars(description = "Filename mode: filename, random or filename_timestamp")]
    pub filename_mode: Option<String>,
    #[schemars(description = "Total write attempts (default 3)")]
    pub max_retries: Option<u32>,
    #[schemars(description = "Request timeout in seconds")]
    pub request_timeout: Option<u64>,
    #[schemars(description = "Credential overrides for this call")]
    pub credentials: Option<CredentialsParam>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MultiUploadFilesRequest {
    #[schemars(description = "Up to 10 files, each in the same shapes upload_file accepts")]
    pub files: serde_json::Value,
    #[schemars(description = "Target directory inside the bucket; empty for the root")]
    pub directory: Option<String>,
    #[schemars(
        description = "Date subdirectory: no_subdirectory, yyyy_mm_dd_hierarchy or yyyy_mm_dd_combined"
    )]
    pub directory_mode: Option<String>,
    #[schemars(description = "Filename mode: filename, random or filename_timestamp")]
    pub filename_mode: Option<String>,
    #[schemars(description = "Total write attempts per file (default 3)")]
    pub max_retries: Option<u32>,
    #[schemars(description = "Request timeout in seconds")]
    pub request_timeout: Option<u64>,
    #[schemars(description = "Credential overrides for this call")]
    pub credentials: Option<CredentialsParam>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFileByUrlRequest {
    #[schemars(description = "Object URL: https://{bucket}.{endpoint}/{key}")]
    pub url: Option<String>,
    #[schemars(description = "Object key, used when no URL is given")]
    pub object_key: Option<String>,
    #[schemars(description = "Bucket, when different from the configured one")]
    pub bucket: Option<String>,
    #[schemars(description = "Endpoint, when different from the configured one")]
    pub endpoint: Option<String>,
    #[schemars(description = "Name for the downloaded file")]
    pub filename: Option<String>,
    #[schemars(description = "Access key ID, when the server has none configured")]
    pub access_key_id: Option<String>,
    #[schemars(description = "Access key secret, when the server has none configured")]
    pub access_key_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ValidateCredentialsRequest {
    #[schemars(description = "Credentials to check; omitted fields use the configured ones")]
    pub credentials: Option<CredentialsParam>,
    #[schemars(description = "Default directory to check for format")]
    pub directory: Option<String>,
    #[schemars(description = "Default filename to check for format")]
    pub filename: Option<String>,
}
