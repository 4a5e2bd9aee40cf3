//! ossbridge Tools
//!
//! The operations a host invokes: single and batch upload, download by URL or
//! key, and credential validation. Each operation returns a structured result;
//! [`summary`] renders the prose that goes with it.

pub mod batch;
pub mod download;
pub mod params;
pub mod provider;
pub mod retry;
pub mod summary;
pub mod upload;

use std::sync::Arc;

use ossbridge_core::{Clock, SystemClock, ToolsConfig};
use ossbridge_storage::{S3StorageFactory, StorageFactory};

pub use batch::{BatchUploadResult, MAX_BATCH_FILES};
pub use download::{CredentialSource, DownloadRequest, DownloadResult, Downloader};
pub use provider::CredentialValidator;
pub use retry::RetryPolicy;
pub use upload::{UploadExecutor, UploadResult};

/// Everything a host surface needs, wired to one storage factory and clock
pub struct ToolService {
    pub config: ToolsConfig,
    pub uploader: UploadExecutor,
    pub downloader: Downloader,
    pub validator: CredentialValidator,
}

impl ToolService {
    pub fn new(config: ToolsConfig, factory: Arc<dyn StorageFactory>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            uploader: UploadExecutor::new(factory.clone(), clock),
            downloader: Downloader::new(factory.clone()),
            validator: CredentialValidator::new(factory),
        }
    }

    /// Real OSS/TOS backends and the system clock
    pub fn from_config(config: ToolsConfig) -> Self {
        Self::new(config, Arc::new(S3StorageFactory), Arc::new(SystemClock))
    }
}
