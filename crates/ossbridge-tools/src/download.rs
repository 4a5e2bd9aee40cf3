//! Download by object URL or object key.

use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};

use ossbridge_core::content_type::{
    extension_from_mime, file_type_from_mime, split_extension, DEFAULT_CONTENT_TYPE,
};
use ossbridge_core::{parse_object_url, StorageCredentials, ToolError, ToolResult, UploadStatus};
use ossbridge_storage::StorageFactory;

const FALLBACK_FILENAME: &str = "download";

/// Parameters of a download call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadRequest {
    pub url: Option<String>,
    pub object_key: Option<String>,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    /// Name for the downloaded file; defaults to the key's basename
    pub filename: Option<String>,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
}

/// Where the access key pair of a download came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// The credentials bound to the provider
    Provider,
    /// Keys passed with the call
    Inline,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn serialize_base64<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub status: UploadStatus,
    pub filename: String,
    pub object_key: String,
    pub bucket: String,
    pub endpoint: String,
    pub file_size: u64,
    pub content_type: String,
    pub file_type: String,
    #[serde(rename = "file_content", serialize_with = "serialize_base64")]
    pub content: Bytes,
}

/// Filename for a downloaded object.
///
/// The override wins, else the key's basename, else `download`. A name without
/// an extension borrows one from a known content type.
pub fn download_filename(explicit: Option<&str>, object_key: &str, content_type: &str) -> String {
    let filename = non_empty(explicit)
        .map(str::to_string)
        .or_else(|| {
            object_key
                .rsplit('/')
                .next()
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

    let (_, extension) = split_extension(&filename);
    if extension.is_empty() && content_type != DEFAULT_CONTENT_TYPE {
        format!("{}{}", filename, extension_from_mime(content_type))
    } else {
        filename
    }
}

/// Extension without the dot, else the content type's category, else `unknown`
pub fn download_file_type(filename: &str, content_type: &str) -> String {
    let (_, extension) = split_extension(filename);
    match extension.trim_start_matches('.') {
        "" => file_type_from_mime(content_type)
            .unwrap_or("unknown")
            .to_string(),
        ext => ext.to_lowercase(),
    }
}

/// Target object and the credentials to read it with
fn resolve_target(
    request: &DownloadRequest,
    provider: &StorageCredentials,
) -> ToolResult<(StorageCredentials, String, CredentialSource)> {
    let url = non_empty(request.url.as_deref());
    let key = non_empty(request.object_key.as_deref());

    let mut bucket = non_empty(request.bucket.as_deref())
        .unwrap_or(provider.bucket.as_str())
        .to_string();
    let mut endpoint = non_empty(request.endpoint.as_deref())
        .unwrap_or(provider.endpoint.as_str())
        .to_string();

    let object_key = match (url, key) {
        (Some(url), _) => {
            let parsed = parse_object_url(url)?;
            bucket = parsed.bucket;
            endpoint = parsed.endpoint;
            parsed.object_key
        }
        (None, Some(key)) => key.trim_start_matches('/').to_string(),
        (None, None) => {
            return Err(ToolError::validation(
                "Missing required parameter: either 'url' or 'object_key' must be provided",
            ))
        }
    };
    if object_key.is_empty() {
        return Err(ToolError::validation("Object key is empty"));
    }

    if endpoint.trim().is_empty() {
        return Err(ToolError::MissingCredential("endpoint"));
    }
    if bucket.trim().is_empty() {
        return Err(ToolError::MissingCredential("bucket"));
    }

    let provider_keys = !provider.access_key_id.trim().is_empty()
        && !provider.access_key_secret.trim().is_empty();
    let mut credentials = provider.retarget(&bucket, &endpoint);
    let source = if provider_keys {
        CredentialSource::Provider
    } else {
        credentials.access_key_id = non_empty(request.access_key_id.as_deref())
            .ok_or(ToolError::MissingCredential("access_key_id"))?
            .to_string();
        credentials.access_key_secret = non_empty(request.access_key_secret.as_deref())
            .ok_or(ToolError::MissingCredential("access_key_secret"))?
            .to_string();
        CredentialSource::Inline
    };

    Ok((credentials, object_key, source))
}

pub struct Downloader {
    factory: Arc<dyn StorageFactory>,
}

impl Downloader {
    pub fn new(factory: Arc<dyn StorageFactory>) -> Self {
        Self { factory }
    }

    /// Read one object. A URL's bucket and endpoint override both the request
    /// fields and the provider's. There is no unauthenticated fallback.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        provider: &StorageCredentials,
    ) -> ToolResult<DownloadResult> {
        let (credentials, object_key, credential_source) = resolve_target(request, provider)?;
        let storage = self.factory.connect(&credentials)?;

        let head = storage.head_object(&object_key).await?;
        let (content, _) = storage.get_object(&object_key).await?;

        let content_type = head
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let filename = download_filename(request.filename.as_deref(), &object_key, &content_type);
        let file_type = download_file_type(&filename, &content_type);

        tracing::info!(
            bucket = %credentials.bucket,
            key = %object_key,
            size_bytes = head.content_length,
            credentials = ?credential_source,
            "File downloaded"
        );

        Ok(DownloadResult {
            status: UploadStatus::Success,
            filename,
            object_key,
            bucket: credentials.bucket.clone(),
            endpoint: credentials.endpoint_host().to_string(),
            file_size: head.content_length,
            content_type,
            file_type,
            content,
        })
    }
}
