use crate::traits::{ObjectMetadata, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ClientOptions, GetOptions, ObjectStore, PutOptions, PutPayload,
    RetryConfig,
};
use ossbridge_core::StorageCredentials;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

/// S3 error codes arrive in XML (`<Code>..</Code>`) or, on some TOS
/// endpoints, JSON (`"Code": ".."`) bodies.
static ERROR_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Code>([^<]+)</Code>|"Code"\s*:\s*"([^"]+)""#)
        .expect("error code pattern is valid")
});

/// Pull the backend error code out of an error message
pub fn extract_error_code(message: &str) -> Option<String> {
    let captures = ERROR_CODE.captures(message)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().trim().to_string())
}

fn map_error(err: ObjectStoreError, key: &str) -> StorageError {
    let message = err.to_string();
    let code = extract_error_code(&message);
    match err {
        ObjectStoreError::NotFound { .. } if code.as_deref() != Some("NoSuchBucket") => {
            StorageError::NotFound(key.to_string())
        }
        ObjectStoreError::PermissionDenied { .. } => {
            StorageError::backend(code.or_else(|| Some("AccessDenied".to_string())), message)
        }
        _ => StorageError::backend(code, message),
    }
}

/// Location of `key`, refusing keys `object_store` would store under a
/// different name.
fn location(key: &str) -> StorageResult<Path> {
    let location = Path::parse(key)
        .map_err(|e| StorageError::Config(format!("Invalid object key '{}': {}", key, e)))?;
    if location.as_ref() != key {
        return Err(StorageError::Config(format!(
            "Invalid object key '{}': stored as '{}'",
            key, location
        )));
    }
    Ok(location)
}

/// [`ObjectStorage`] over any `object_store` implementation
///
/// Production handles wrap an `AmazonS3` client pointed at the backend's
/// S3-compatible host; tests wrap `InMemory`. [`ObjectStorage::endpoint`]
/// reports the configured host, which public URLs use.
#[derive(Clone)]
pub struct ObjectStoreStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    endpoint: String,
}

impl ObjectStoreStorage {
    /// Build a client for the bucket named in `credentials`.
    ///
    /// Does not touch the network. The client's own retries are disabled;
    /// callers own the retry policy.
    pub fn connect(credentials: &StorageCredentials) -> StorageResult<Self> {
        let endpoint = credentials.endpoint_host().to_string();
        if endpoint.is_empty() {
            return Err(StorageError::Config("Endpoint is empty".to_string()));
        }
        if credentials.bucket.trim().is_empty() {
            return Err(StorageError::Config("Bucket is empty".to_string()));
        }

        let mut client_options = ClientOptions::new()
            .with_allow_http(!credentials.use_https)
            .with_allow_invalid_certificates(!credentials.enable_verify_ssl);
        if let Some(secs) = credentials.request_timeout_secs {
            client_options = client_options.with_timeout(Duration::from_secs(secs));
        }

        let api_endpoint = credentials.backend.s3_endpoint(&endpoint);
        let virtual_host = format!(
            "{}://{}.{}",
            credentials.scheme(),
            credentials.bucket,
            api_endpoint
        );

        let store = AmazonS3Builder::new()
            .with_bucket_name(credentials.bucket.clone())
            .with_region(credentials.resolved_region())
            .with_endpoint(virtual_host)
            .with_virtual_hosted_style_request(true)
            .with_access_key_id(credentials.access_key_id.clone())
            .with_secret_access_key(credentials.access_key_secret.clone())
            .with_client_options(client_options)
            .with_retry(RetryConfig {
                max_retries: 0,
                ..Default::default()
            })
            .build()
            .map_err(|e| StorageError::Config(e.to_string()))?;

        tracing::debug!(
            backend = %credentials.backend,
            bucket = %credentials.bucket,
            endpoint = %endpoint,
            api_endpoint = %api_endpoint,
            "Storage client configured"
        );

        Ok(Self {
            store: Arc::new(store),
            bucket: credentials.bucket.clone(),
            endpoint,
        })
    }

    /// Wrap an existing store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Fresh, empty in-memory bucket
    pub fn in_memory(bucket: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::from_store(Arc::new(InMemory::new()), bucket, endpoint)
    }
}

fn content_type_of(attributes: &Attributes) -> Option<String> {
    attributes
        .get(&Attribute::ContentType)
        .map(|value| value.to_string())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl ObjectStorage for ObjectStoreStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn probe_bucket(&self) -> StorageResult<()> {
        let start = Instant::now();

        self.store.list_with_delimiter(None).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                endpoint = %self.endpoint,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Bucket probe failed"
            );
            map_error(e, "")
        })?;

        tracing::info!(
            bucket = %self.bucket,
            endpoint = %self.endpoint,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Bucket probe successful"
        );
        Ok(())
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = location(key)?;
        let start = Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&location, PutPayload::from(data), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                map_error(e, key)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let location = location(key)?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        let result = self
            .store
            .get_opts(&location, options)
            .await
            .map_err(|e| map_error(e, key))?;

        Ok(ObjectMetadata {
            content_length: result.meta.size,
            content_type: content_type_of(&result.attributes),
        })
    }

    async fn get_object(&self, key: &str) -> StorageResult<(Bytes, ObjectMetadata)> {
        let start = Instant::now();
        let location = location(key)?;

        let result = self
            .store
            .get_opts(&location, GetOptions::default())
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object download failed"
                );
                map_error(e, key)
            })?;

        let content_type = content_type_of(&result.attributes);
        let bytes = result
            .bytes()
            .await
            .map_err(|e| map_error(e, key))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object download successful"
        );

        let metadata = ObjectMetadata {
            content_length: bytes.len() as u64,
            content_type,
        };
        Ok((bytes, metadata))
    }
}
