//! Single-file upload pipeline.
//!
//! resolve source -> build key -> content type from the final filename ->
//! write (retried) -> public URL. Only the write is retried; every earlier
//! step fails fast.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use ossbridge_core::content_type::{mime_from_extension, split_extension};
use ossbridge_core::url::public_object_url;
use ossbridge_core::{
    Clock, ObjectKeyBuilder, SourceDescriptor, StorageCredentials, ToolError, ToolResult,
    UploadRequest, UploadStatus,
};
use ossbridge_storage::{ObjectStorage, StorageError, StorageFactory};

use crate::provider::check_required;
use crate::retry::RetryPolicy;

/// Outcome of one file upload. Failed entries only appear inside batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    /// Final filename, after the filename mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Name the source carried, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Extension without the dot, or `unknown`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    pub fn failed(source_filename: Option<String>, error: &ToolError) -> Self {
        Self {
            status: UploadStatus::Failed,
            file_url: None,
            object_key: None,
            filename: None,
            source_filename,
            content_type: None,
            file_type: None,
            file_size: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

pub struct UploadExecutor {
    factory: Arc<dyn StorageFactory>,
    clock: Arc<dyn Clock>,
}

impl UploadExecutor {
    pub fn new(factory: Arc<dyn StorageFactory>, clock: Arc<dyn Clock>) -> Self {
        Self { factory, clock }
    }

    pub(crate) fn factory(&self) -> &Arc<dyn StorageFactory> {
        &self.factory
    }

    /// Upload one source with the given options and credentials
    pub async fn upload(
        &self,
        source: &mut SourceDescriptor,
        request: &UploadRequest,
        credentials: &StorageCredentials,
    ) -> ToolResult<UploadResult> {
        check_required(credentials)?;
        let storage = self.factory.connect(credentials)?;
        self.upload_to(storage.as_ref(), credentials.scheme(), source, request)
            .await
    }

    /// Pipeline against an already-open storage handle
    pub(crate) async fn upload_to(
        &self,
        storage: &dyn ObjectStorage,
        scheme: &str,
        source: &mut SourceDescriptor,
        request: &UploadRequest,
    ) -> ToolResult<UploadResult> {
        if request.max_retries == 0 {
            return Err(ToolError::validation("max_retries must be at least 1"));
        }

        let resolved = source.resolve().await?;

        let builder = ObjectKeyBuilder::new(request.directory_mode, request.filename_mode);
        let raw_filename = resolved.raw_filename(request.filename.as_deref());
        let directory = request.directory.as_deref().unwrap_or("");
        let key = builder.build(directory, &raw_filename, &self.clock.now())?;

        let filename = key.file_name().to_string();
        let (_, extension) = split_extension(&filename);
        let content_type = mime_from_extension(extension);
        let file_type = match extension.trim_start_matches('.') {
            "" => "unknown".to_string(),
            ext => ext.to_lowercase(),
        };

        let start = Instant::now();
        RetryPolicy::new(request.max_retries)
            .run_if("put_object", StorageError::is_retryable, |_| {
                storage.put_object(key.as_str(), resolved.content.clone(), content_type)
            })
            .await?;

        let file_url = public_object_url(scheme, storage.bucket(), storage.endpoint(), key.as_str());

        tracing::info!(
            bucket = %storage.bucket(),
            key = %key,
            size_bytes = resolved.byte_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded"
        );

        Ok(UploadResult {
            status: UploadStatus::Success,
            file_url: Some(file_url),
            object_key: Some(key.into_string()),
            filename: Some(filename),
            source_filename: resolved.origin_filename,
            content_type: Some(content_type.to_string()),
            file_type: Some(file_type),
            file_size: resolved.byte_length,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::NaiveDate;
    use futures::TryStreamExt;
    use object_store::ObjectStore;
    use ossbridge_core::{
        parse_object_url, Backend, DirectoryMode, FilenameMode, FixedClock, StructuredUpload,
    };
    use ossbridge_storage::MemoryStorageFactory;

    fn executor(factory: Arc<MemoryStorageFactory>) -> UploadExecutor {
        let now = NaiveDate::from_ymd_opt(2025, 9, 10)
            .unwrap()
            .and_hms_milli_opt(13, 4, 5, 123)
            .unwrap();
        UploadExecutor::new(factory, Arc::new(FixedClock(now)))
    }

    fn creds() -> StorageCredentials {
        StorageCredentials::new(
            Backend::AliyunOss,
            "oss-cn-hangzhou.aliyuncs.com",
            "media",
            "id",
            "secret",
        )
    }

    #[tokio::test]
    async fn structured_upload_lands_under_dated_directory() {
        let factory = Arc::new(MemoryStorageFactory::new());
        let mut source = SourceDescriptor::Structured(StructuredUpload {
            filename: Some("cat.PNG".to_string()),
            content_type: Some("image/png".to_string()),
            blob: Bytes::from_static(b"\x89PNG"),
        });
        let request = UploadRequest {
            directory: Some("pets/".to_string()),
            directory_mode: DirectoryMode::YyyyMmDdHierarchy,
            ..UploadRequest::default()
        };

        let result = executor(factory.clone())
            .upload(&mut source, &request, &creds())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.object_key.as_deref(), Some("pets/2025/09/10/cat.png"));
        assert_eq!(
            result.file_url.as_deref(),
            Some("https://media.oss-cn-hangzhou.aliyuncs.com/pets/2025/09/10/cat.png")
        );
        assert_eq!(result.content_type.as_deref(), Some("image/png"));
        assert_eq!(result.file_type.as_deref(), Some("png"));
        assert_eq!(result.file_size, 4);
        assert_eq!(result.source_filename.as_deref(), Some("cat.PNG"));

        let stored = factory
            .connect(&creds())
            .unwrap()
            .head_object("pets/2025/09/10/cat.png")
            .await
            .unwrap();
        assert_eq!(stored.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn explicit_filename_gets_timestamp() {
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"{}"));
        let request = UploadRequest {
            filename: Some("data.json".to_string()),
            filename_mode: FilenameMode::Timestamped,
            ..UploadRequest::default()
        };
        let result = executor(Arc::new(MemoryStorageFactory::new()))
            .upload(&mut source, &request, &creds())
            .await
            .unwrap();
        assert_eq!(
            result.object_key.as_deref(),
            Some("data_20250910130405123.json")
        );
        assert_eq!(result.content_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn http_scheme_when_https_disabled() {
        let mut c = creds();
        c.use_https = false;
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let request = UploadRequest {
            filename: Some("x.txt".to_string()),
            ..UploadRequest::default()
        };
        let result = executor(Arc::new(MemoryStorageFactory::new()))
            .upload(&mut source, &request, &c)
            .await
            .unwrap();
        assert_eq!(
            result.file_url.as_deref(),
            Some("http://media.oss-cn-hangzhou.aliyuncs.com/x.txt")
        );
    }

    #[tokio::test]
    async fn reported_key_matches_stored_location() {
        let factory = Arc::new(MemoryStorageFactory::new());
        let executor = executor(factory.clone());

        for (directory, filename, expected) in [
            ("a//b", "f.txt", "a/b/f.txt"),
            ("docs", "100%.txt", "docs/100%.txt"),
        ] {
            let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
            let request = UploadRequest {
                directory: Some(directory.to_string()),
                filename: Some(filename.to_string()),
                ..UploadRequest::default()
            };
            let result = executor.upload(&mut source, &request, &creds()).await.unwrap();
            assert_eq!(result.object_key.as_deref(), Some(expected));

            let url = result.file_url.as_deref().unwrap();
            assert_eq!(parse_object_url(url).unwrap().object_key, expected);
        }

        let mut listed: Vec<String> = factory
            .store("media")
            .unwrap()
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        listed.sort();
        assert_eq!(listed, vec!["a/b/f.txt", "docs/100%.txt"]);
    }

    #[tokio::test]
    async fn padded_origin_name_is_not_a_validation_error() {
        let mut source = SourceDescriptor::Structured(StructuredUpload {
            filename: Some(" photo.png".to_string()),
            content_type: None,
            blob: Bytes::from_static(b"x"),
        });
        let request = UploadRequest {
            directory: Some("img".to_string()),
            ..UploadRequest::default()
        };
        let result = executor(Arc::new(MemoryStorageFactory::new()))
            .upload(&mut source, &request, &creds())
            .await
            .unwrap();
        assert_eq!(result.object_key.as_deref(), Some("img/photo.png"));
        assert_eq!(result.source_filename.as_deref(), Some(" photo.png"));

        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let request = UploadRequest {
            filename: Some(" photo.png".to_string()),
            ..UploadRequest::default()
        };
        let err = executor(Arc::new(MemoryStorageFactory::new()))
            .upload(&mut source, &request, &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn dot_segment_fails_before_write() {
        let factory = Arc::new(MemoryStorageFactory::new());
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let request = UploadRequest {
            directory: Some("a/../b".to_string()),
            filename: Some("f.txt".to_string()),
            ..UploadRequest::default()
        };
        let err = executor(factory.clone())
            .upload(&mut source, &request, &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        let stored: Vec<_> = factory
            .store("media")
            .unwrap()
            .list(None)
            .try_collect()
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn invalid_directory_fails_before_write() {
        let factory = Arc::new(MemoryStorageFactory::new());
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let request = UploadRequest {
            directory: Some("/abs".to_string()),
            ..UploadRequest::default()
        };
        let err = executor(factory)
            .upload(&mut source, &request, &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_credential_is_reported() {
        let mut c = creds();
        c.access_key_id.clear();
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let err = executor(Arc::new(MemoryStorageFactory::new()))
            .upload(&mut source, &UploadRequest::default(), &c)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingCredential("access_key_id")));
    }
}
