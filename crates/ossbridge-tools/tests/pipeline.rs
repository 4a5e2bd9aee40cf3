//! Upload, batch, download and validation flows against an in-memory bucket
//! with injectable write failures.

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use tokio::time::Instant;

use ossbridge_core::{
    Backend, FixedClock, SourceDescriptor, StorageCredentials, StructuredUpload, ToolError,
    ToolsConfig, UploadRequest, UploadStatus,
};
use ossbridge_storage::{
    ObjectMetadata, ObjectStorage, ObjectStoreStorage, StorageError, StorageFactory, StorageResult,
};
use ossbridge_tools::{summary, DownloadRequest, ToolService, UploadExecutor};

/// In-memory bucket whose writes fail on demand
struct FlakyStorage {
    inner: ObjectStoreStorage,
    /// Number of leading writes that fail
    fail_first: u32,
    /// Writes to keys containing this always fail
    fail_keys_containing: Option<&'static str>,
    probe_error_code: Option<&'static str>,
    put_calls: AtomicU32,
    put_times: Mutex<Vec<Instant>>,
}

impl FlakyStorage {
    fn new() -> Self {
        Self {
            inner: ObjectStoreStorage::in_memory("media", "oss-cn-hangzhou.aliyuncs.com"),
            fail_first: 0,
            fail_keys_containing: None,
            probe_error_code: None,
            put_calls: AtomicU32::new(0),
            put_times: Mutex::new(Vec::new()),
        }
    }

    fn failing_first(mut self, n: u32) -> Self {
        self.fail_first = n;
        self
    }

    fn failing_keys(mut self, needle: &'static str) -> Self {
        self.fail_keys_containing = Some(needle);
        self
    }

    fn rejecting_probe(mut self, code: &'static str) -> Self {
        self.probe_error_code = Some(code);
        self
    }

    fn put_calls(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for FlakyStorage {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }

    async fn probe_bucket(&self) -> StorageResult<()> {
        match self.probe_error_code {
            Some(code) => Err(StorageError::backend(Some(code.to_string()), "probe rejected")),
            None => self.inner.probe_bucket().await,
        }
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let call = self.put_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.put_times.lock().unwrap().push(Instant::now());

        let key_fails = self
            .fail_keys_containing
            .is_some_and(|needle| key.contains(needle));
        if call <= self.fail_first || key_fails {
            return Err(StorageError::backend(
                Some("InternalError".to_string()),
                format!("injected failure {}", call),
            ));
        }
        self.inner.put_object(key, data, content_type).await
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectMetadata> {
        self.inner.head_object(key).await
    }

    async fn get_object(&self, key: &str) -> StorageResult<(Bytes, ObjectMetadata)> {
        self.inner.get_object(key).await
    }
}

struct FlakyFactory {
    storage: Arc<FlakyStorage>,
    connect_calls: AtomicU32,
}

impl FlakyFactory {
    fn new(storage: FlakyStorage) -> Arc<Self> {
        Arc::new(Self {
            storage: Arc::new(storage),
            connect_calls: AtomicU32::new(0),
        })
    }
}

impl StorageFactory for FlakyFactory {
    fn connect(&self, _credentials: &StorageCredentials) -> StorageResult<Arc<dyn ObjectStorage>> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.storage.clone())
    }
}

fn clock() -> Arc<FixedClock> {
    let now = NaiveDate::from_ymd_opt(2025, 9, 10)
        .unwrap()
        .and_hms_milli_opt(13, 4, 5, 0)
        .unwrap();
    Arc::new(FixedClock(now))
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

fn named(name: &str, body: &'static [u8]) -> SourceDescriptor {
    SourceDescriptor::Structured(StructuredUpload {
        filename: Some(name.to_string()),
        content_type: None,
        blob: Bytes::from_static(body),
    })
}

#[tokio::test(start_paused = true)]
async fn write_retried_with_exponential_backoff() {
    let factory = FlakyFactory::new(FlakyStorage::new().failing_first(2));
    let executor = UploadExecutor::new(factory.clone(), clock());

    let mut source = named("a.txt", b"abc");
    let result = executor
        .upload(&mut source, &UploadRequest::default(), &creds())
        .await
        .unwrap();

    assert_eq!(result.status, UploadStatus::Success);
    assert_eq!(factory.storage.put_calls(), 3);

    let times = factory.storage.put_times.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(1));
    assert_eq!(times[2] - times[1], Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn always_failing_write_surfaces_last_error() {
    let factory = FlakyFactory::new(FlakyStorage::new().failing_first(u32::MAX));
    let executor = UploadExecutor::new(factory.clone(), clock());

    let start = Instant::now();
    let mut source = named("a.txt", b"abc");
    let err = executor
        .upload(&mut source, &UploadRequest::default(), &creds())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::StorageOperation { .. }));
    assert_eq!(err.to_string(), "injected failure 3");
    assert_eq!(err.code(), Some("InternalError"));
    assert_eq!(factory.storage.put_calls(), 3);
    // no pause after the final attempt
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let factory = FlakyFactory::new(FlakyStorage::new());
    let executor = UploadExecutor::new(factory.clone(), clock());

    let request = UploadRequest {
        filename: Some(" leading-space.txt".to_string()),
        ..UploadRequest::default()
    };
    let err = executor
        .upload(&mut named("a.txt", b"x"), &request, &creds())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Validation(_)));
    assert_eq!(factory.storage.put_calls(), 0);
}

#[tokio::test]
async fn batch_reports_each_file_independently() {
    let factory = FlakyFactory::new(FlakyStorage::new().failing_keys("bad"));
    let executor = UploadExecutor::new(factory.clone(), clock());

    let sources = vec![
        named("first.txt", b"1"),
        named("bad.txt", b"22"),
        named("third.txt", b"333"),
    ];
    let request = UploadRequest {
        directory: Some("batch".to_string()),
        max_retries: 1,
        ..UploadRequest::default()
    };

    let batch = executor
        .upload_batch(sources, &request, &creds(), 2)
        .await
        .unwrap();

    assert_eq!(batch.success_count, 2);
    assert_eq!(batch.error_count, 1);
    assert_eq!(batch.total_size, 4);
    assert_eq!(batch.files[0].object_key.as_deref(), Some("batch/first.txt"));
    assert_eq!(batch.files[1].status, UploadStatus::Failed);
    assert_eq!(batch.files[1].source_filename.as_deref(), Some("bad.txt"));
    assert!(batch.files[1]
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("injected failure")));
    assert_eq!(batch.files[2].object_key.as_deref(), Some("batch/third.txt"));
    assert_eq!(
        batch.file_urls,
        vec![
            "https://media.oss-cn-hangzhou.aliyuncs.com/batch/first.txt".to_string(),
            "https://media.oss-cn-hangzhou.aliyuncs.com/batch/third.txt".to_string(),
        ]
    );

    let text = summary::batch_summary(&batch);
    assert!(text.contains("Failed files (1):"));
}

#[tokio::test]
async fn oversized_batch_rejected_before_any_storage_call() {
    let factory = FlakyFactory::new(FlakyStorage::new());
    let executor = UploadExecutor::new(factory.clone(), clock());

    let sources = (0..11).map(|i| named(&format!("f{}.txt", i), b"x")).collect();
    let err = executor
        .upload_batch(sources, &UploadRequest::default(), &creds(), 4)
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Validation(_)));
    assert_eq!(factory.connect_calls.load(Ordering::SeqCst), 0);
    assert_eq!(factory.storage.put_calls(), 0);
}

#[tokio::test]
async fn path_upload_then_download_by_url() {
    let factory = FlakyFactory::new(FlakyStorage::new());
    let service = ToolService::new(ToolsConfig::default(), factory, clock());

    let mut file = tempfile::Builder::new()
        .prefix("report")
        .suffix(".PDF")
        .tempfile()
        .unwrap();
    file.write_all(b"%PDF-1.7 body").unwrap();

    let mut source = SourceDescriptor::Path(file.path().to_path_buf());
    let uploaded = service
        .uploader
        .upload(&mut source, &UploadRequest::default(), &creds())
        .await
        .unwrap();
    assert_eq!(uploaded.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploaded.file_size, 13);

    let request = DownloadRequest {
        url: uploaded.file_url.clone(),
        ..DownloadRequest::default()
    };
    let downloaded = service.downloader.download(&request, &creds()).await.unwrap();
    assert_eq!(downloaded.content.as_ref(), b"%PDF-1.7 body");
    assert_eq!(downloaded.content_type, "application/pdf");
    assert_eq!(downloaded.file_type, "pdf");
    assert_eq!(Some(downloaded.object_key), uploaded.object_key);
}

#[tokio::test]
async fn rejected_probe_becomes_credential_error() {
    let factory = FlakyFactory::new(FlakyStorage::new().rejecting_probe("InvalidAccessKeyId"));
    let service = ToolService::new(ToolsConfig::default(), factory.clone(), clock());

    let err = service.validator.validate(&creds()).await.unwrap_err();
    assert!(matches!(err, ToolError::CredentialValidation { .. }));
    assert_eq!(err.to_string(), "Invalid Access Key ID");
    assert_eq!(factory.connect_calls.load(Ordering::SeqCst), 1);
}
