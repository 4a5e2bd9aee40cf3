use crate::s3::ObjectStoreStorage;
use crate::{ObjectStorage, StorageResult};
use object_store::memory::InMemory;
use ossbridge_core::StorageCredentials;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Opens a storage handle for one call's credentials
pub trait StorageFactory: Send + Sync {
    fn connect(&self, credentials: &StorageCredentials) -> StorageResult<Arc<dyn ObjectStorage>>;
}

/// Real S3-compatible backends (OSS, TOS)
#[derive(Debug, Clone, Copy, Default)]
pub struct S3StorageFactory;

impl StorageFactory for S3StorageFactory {
    fn connect(&self, credentials: &StorageCredentials) -> StorageResult<Arc<dyn ObjectStorage>> {
        Ok(Arc::new(ObjectStoreStorage::connect(credentials)?))
    }
}

/// In-memory buckets, one per bucket name, shared by every handle this
/// factory hands out. Credentials are accepted as-is.
#[derive(Default)]
pub struct MemoryStorageFactory {
    buckets: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl MemoryStorageFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store behind `bucket`, if any handle has been opened on it
    pub fn store(&self, bucket: &str) -> Option<Arc<InMemory>> {
        self.buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(bucket)
            .cloned()
    }
}

impl StorageFactory for MemoryStorageFactory {
    fn connect(&self, credentials: &StorageCredentials) -> StorageResult<Arc<dyn ObjectStorage>> {
        let store = {
            let mut buckets = self
                .buckets
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            buckets
                .entry(credentials.bucket.clone())
                .or_insert_with(|| Arc::new(InMemory::new()))
                .clone()
        };

        Ok(Arc::new(ObjectStoreStorage::from_store(
            store,
            credentials.bucket.clone(),
            credentials.endpoint_host().to_string(),
        )))
    }
}
