//! Multi-file upload: up to [`MAX_BATCH_FILES`] sources, each independent.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use ossbridge_core::{
    SourceDescriptor, StorageCredentials, ToolError, ToolResult, UploadRequest, UploadStatus,
};

use crate::provider::check_required;
use crate::upload::{UploadExecutor, UploadResult};

pub const MAX_BATCH_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchUploadResult {
    /// `success` when at least one file was uploaded
    pub status: UploadStatus,
    /// Per-file results, in input order
    pub files: Vec<UploadResult>,
    pub success_count: usize,
    pub error_count: usize,
    /// URLs of the successful uploads, in input order
    pub file_urls: Vec<String>,
    /// Bytes written across successful uploads
    pub total_size: u64,
}

impl BatchUploadResult {
    fn from_results(files: Vec<UploadResult>) -> Self {
        let success_count = files.iter().filter(|f| f.is_success()).count();
        let file_urls = files.iter().filter_map(|f| f.file_url.clone()).collect();
        let total_size = files
            .iter()
            .filter(|f| f.is_success())
            .map(|f| f.file_size)
            .sum();

        Self {
            status: if success_count > 0 {
                UploadStatus::Success
            } else {
                UploadStatus::Failed
            },
            error_count: files.len() - success_count,
            success_count,
            file_urls,
            total_size,
            files,
        }
    }
}

/// Reject empty and oversized batches before anything touches storage
pub fn check_batch_size(count: usize) -> ToolResult<()> {
    if count == 0 {
        return Err(ToolError::validation("No files provided"));
    }
    if count > MAX_BATCH_FILES {
        return Err(ToolError::validation(format!(
            "A maximum of {} files can be uploaded at once, got {}",
            MAX_BATCH_FILES, count
        )));
    }
    Ok(())
}

/// Best-effort name of a source for reporting a failure that happened before
/// the source was resolved
fn source_hint(source: &SourceDescriptor) -> Option<String> {
    let from_path = |path: &std::path::Path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    };
    match source {
        SourceDescriptor::Structured(upload) => upload.filename.clone(),
        SourceDescriptor::Stream(stream) => stream.name.as_deref().and_then(from_path),
        SourceDescriptor::Path(path) => from_path(path),
        SourceDescriptor::Bytes(_) => None,
    }
}

impl UploadExecutor {
    /// Upload every source with shared options.
    ///
    /// `request.filename` is ignored: each file keeps its own name. A failing
    /// file is recorded in its slot and does not stop the others. At most
    /// `concurrency` files are in flight at once.
    pub async fn upload_batch(
        &self,
        sources: Vec<SourceDescriptor>,
        request: &UploadRequest,
        credentials: &StorageCredentials,
        concurrency: usize,
    ) -> ToolResult<BatchUploadResult> {
        check_batch_size(sources.len())?;
        check_required(credentials)?;

        let storage = self.factory().connect(credentials)?;
        let scheme = credentials.scheme();
        let request = UploadRequest {
            filename: None,
            ..request.clone()
        };

        let total = sources.len();
        let results: Vec<UploadResult> = stream::iter(sources.into_iter().enumerate())
            .map(|(index, mut source)| {
                let storage = storage.clone();
                let request = &request;
                async move {
                    let hint = source_hint(&source);
                    match self
                        .upload_to(storage.as_ref(), scheme, &mut source, request)
                        .await
                    {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::warn!(
                                index,
                                total,
                                file = ?hint,
                                error = %e,
                                "File upload failed in batch"
                            );
                            UploadResult::failed(hint, &e)
                        }
                    }
                }
            })
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let batch = BatchUploadResult::from_results(results);
        tracing::info!(
            success_count = batch.success_count,
            error_count = batch.error_count,
            total_size = batch.total_size,
            "Batch upload finished"
        );
        Ok(batch)
    }
}
