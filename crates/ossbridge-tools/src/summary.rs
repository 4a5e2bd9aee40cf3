//! Human-readable summaries that accompany each structured result.

use std::fmt::Write;

use crate::batch::BatchUploadResult;
use crate::download::DownloadResult;
use crate::upload::UploadResult;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub fn upload_summary(result: &UploadResult) -> String {
    format!(
        "File uploaded successfully!\n\
         Filename: {}\n\
         File type: {}\n\
         File size: {:.2} MB\n\
         Access URL: {}\n\
         Object key: {}",
        result.filename.as_deref().unwrap_or_default(),
        result.file_type.as_deref().unwrap_or("unknown"),
        megabytes(result.file_size),
        result.file_url.as_deref().unwrap_or_default(),
        result.object_key.as_deref().unwrap_or_default(),
    )
}

pub fn batch_summary(result: &BatchUploadResult) -> String {
    let mut out = format!(
        "Successfully uploaded {} files!\nTotal size: {:.2} MB\nFile URLs:\n",
        result.success_count,
        megabytes(result.total_size)
    );

    for (i, file) in result.files.iter().filter(|f| f.is_success()).enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {}",
            i + 1,
            file.filename.as_deref().unwrap_or_default(),
            file.file_url.as_deref().unwrap_or_default()
        );
    }

    if result.error_count > 0 {
        let _ = writeln!(out, "Failed files ({}):", result.error_count);
        for (i, file) in result.files.iter().filter(|f| !f.is_success()).enumerate() {
            let _ = writeln!(
                out,
                "{}. {}: {}",
                i + 1,
                file.source_filename.as_deref().unwrap_or("<unnamed>"),
                file.error.as_deref().unwrap_or_default()
            );
        }
    }
    out
}

pub fn download_summary(result: &DownloadResult) -> String {
    format!(
        "File downloaded successfully!\n\
         Filename: {}\n\
         File type: {}\n\
         File size: {:.2} MB\n\
         Object key: {}\n\
         Bucket: {}\n\
         Endpoint: {}\n\
         Content type: {}",
        result.filename,
        result.file_type,
        megabytes(result.file_size),
        result.object_key,
        result.bucket,
        result.endpoint,
        result.content_type,
    )
}

/// Message shown when a tool fails
pub fn failure_message(error: &impl std::fmt::Display) -> String {
    format!("Operation failed: {}", error)
}
