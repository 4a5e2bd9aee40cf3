//! Source identity resolution.
//!
//! A [`SourceDescriptor`] is decided once at the API boundary. Resolving it
//! yields the bytes to upload plus whatever naming metadata the source
//! carries; nothing downstream inspects the descriptor again.

use bytes::Bytes;
use std::fmt;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use uuid::Uuid;

use crate::content_type::{extension_from_mime, split_extension, DEFAULT_EXTENSION};
use crate::error::{ToolError, ToolResult};

/// Readable, seekable byte stream
pub trait AsyncReadSeek: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> AsyncReadSeek for T {}

/// Host-native upload object: a name, an optional declared type, and the blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub blob: Bytes,
}

/// An open stream, optionally tagged with the path it was opened from
pub struct StreamSource {
    pub reader: Box<dyn AsyncReadSeek>,
    pub name: Option<PathBuf>,
}

impl StreamSource {
    pub fn new(reader: impl AsyncReadSeek + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<PathBuf>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Everything that can be uploaded
pub enum SourceDescriptor {
    Structured(StructuredUpload),
    Stream(StreamSource),
    Path(PathBuf),
    Bytes(Bytes),
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Structured(upload) => f
                .debug_struct("Structured")
                .field("filename", &upload.filename)
                .field("content_type", &upload.content_type)
                .field("len", &upload.blob.len())
                .finish(),
            SourceDescriptor::Stream(stream) => {
                f.debug_struct("Stream").field("name", &stream.name).finish()
            }
            SourceDescriptor::Path(path) => f.debug_tuple("Path").field(path).finish(),
            SourceDescriptor::Bytes(bytes) => {
                f.debug_struct("Bytes").field("len", &bytes.len()).finish()
            }
        }
    }
}

/// Identity of a source, derived once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub byte_length: u64,
    pub origin_filename: Option<String>,
    /// Lowercased, with leading dot
    pub origin_extension: Option<String>,
    pub declared_content_type: Option<String>,
    pub content: Bytes,
}

impl ResolvedSource {
    fn new(
        content: Bytes,
        byte_length: u64,
        origin_filename: Option<String>,
        declared_content_type: Option<String>,
    ) -> Self {
        let origin_filename = origin_filename.filter(|name| !name.trim().is_empty());
        let origin_extension = origin_filename
            .as_deref()
            .map(split_extension)
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty());
        let declared_content_type = declared_content_type.filter(|ct| !ct.trim().is_empty());

        Self {
            byte_length,
            origin_filename,
            origin_extension,
            declared_content_type,
            content,
        }
    }

    /// Extension for a derived filename: the origin filename's, else the
    /// declared content type's, else `.dat`.
    pub fn inferred_extension(&self) -> String {
        if let Some(ext) = &self.origin_extension {
            return ext.clone();
        }
        self.declared_content_type
            .as_deref()
            .map(extension_from_mime)
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string()
    }

    /// Filename to feed the key builder.
    ///
    /// An explicit filename wins untouched, so the key builder can reject a
    /// malformed one. Otherwise the trimmed stem of the origin basename (or a
    /// fresh UUID when the source carries no usable name) plus the inferred
    /// extension.
    pub fn raw_filename(&self, explicit: Option<&str>) -> String {
        if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }

        let stem = self
            .origin_filename
            .as_deref()
            .map(|name| {
                let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
                split_extension(base).0.trim()
            })
            .filter(|stem| !stem.is_empty() && *stem != "." && *stem != "..")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        format!("{}{}", stem, self.inferred_extension())
    }
}

impl SourceDescriptor {
    /// Read the source and derive its identity.
    ///
    /// Streams are read in full from the start and left at the position they
    /// had before the call.
    pub async fn resolve(&mut self) -> ToolResult<ResolvedSource> {
        match self {
            SourceDescriptor::Structured(upload) => Ok(ResolvedSource::new(
                upload.blob.clone(),
                upload.blob.len() as u64,
                upload.filename.clone(),
                upload.content_type.clone(),
            )),
            SourceDescriptor::Stream(stream) => resolve_stream(stream).await,
            SourceDescriptor::Path(path) => resolve_path(path).await,
            SourceDescriptor::Bytes(bytes) => Ok(ResolvedSource::new(
                bytes.clone(),
                bytes.len() as u64,
                None,
                None,
            )),
        }
    }
}

async fn resolve_stream(stream: &mut StreamSource) -> ToolResult<ResolvedSource> {
    let read_error =
        |e: std::io::Error| ToolError::UnsupportedSource(format!("Failed to read stream: {}", e));

    let reader = &mut stream.reader;
    let position = reader.stream_position().await.map_err(read_error)?;
    reader.seek(SeekFrom::Start(0)).await.map_err(read_error)?;

    let mut buffer = Vec::new();
    let read_result = reader.read_to_end(&mut buffer).await;
    // restore before surfacing a read error
    reader
        .seek(SeekFrom::Start(position))
        .await
        .map_err(read_error)?;
    read_result.map_err(read_error)?;

    let origin_filename = match stream.name.as_deref() {
        Some(name) if tokio::fs::metadata(name).await.is_ok() => basename(name),
        _ => None,
    };

    let length = buffer.len() as u64;
    Ok(ResolvedSource::new(
        Bytes::from(buffer),
        length,
        origin_filename,
        None,
    ))
}

async fn resolve_path(path: &Path) -> ToolResult<ResolvedSource> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            return Err(ToolError::UnsupportedSource(format!(
                "File path does not exist: {}",
                path.display()
            )))
        }
    };

    let content = tokio::fs::read(path).await.map_err(|e| {
        ToolError::UnsupportedSource(format!("Failed to read {}: {}", path.display(), e))
    })?;

    Ok(ResolvedSource::new(
        Bytes::from(content),
        metadata.len(),
        basename(path),
        None,
    ))
}

fn basename(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn structured_upload_uses_field_name() {
        let mut source = SourceDescriptor::Structured(StructuredUpload {
            filename: Some("Report.PDF".to_string()),
            content_type: Some("application/pdf".to_string()),
            blob: Bytes::from_static(b"%PDF"),
        });
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.byte_length, 4);
        assert_eq!(resolved.origin_filename.as_deref(), Some("Report.PDF"));
        assert_eq!(resolved.origin_extension.as_deref(), Some(".pdf"));
        assert_eq!(resolved.raw_filename(None), "Report.pdf");
        assert_eq!(resolved.raw_filename(Some("x.bin")), "x.bin");
    }

    #[tokio::test]
    async fn derived_name_is_trimmed_to_a_clean_basename() {
        for (origin, expected) in [
            (" photo.png", "photo.png"),
            ("/tmp/uploads/a.PNG", "a.png"),
            ("C:\\pics\\ cat.jpg", "cat.jpg"),
        ] {
            let mut source = SourceDescriptor::Structured(StructuredUpload {
                filename: Some(origin.to_string()),
                content_type: None,
                blob: Bytes::from_static(b"x"),
            });
            let resolved = source.resolve().await.unwrap();
            assert_eq!(resolved.raw_filename(None), expected, "{}", origin);
        }

        // an explicit name is passed through for the key builder to check
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"x"));
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.raw_filename(Some(" x.png")), " x.png");
    }

    #[tokio::test]
    async fn declared_content_type_supplies_missing_extension() {
        let mut source = SourceDescriptor::Structured(StructuredUpload {
            filename: None,
            content_type: Some("image/png".to_string()),
            blob: Bytes::from_static(b"png"),
        });
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.inferred_extension(), ".png");
        let name = resolved.raw_filename(None);
        assert!(name.ends_with(".png"));
        assert!(Uuid::parse_str(name.trim_end_matches(".png")).is_ok());
    }

    #[tokio::test]
    async fn filename_extension_beats_declared_type() {
        let mut source = SourceDescriptor::Structured(StructuredUpload {
            filename: Some("notes.md".to_string()),
            content_type: Some("text/plain".to_string()),
            blob: Bytes::from_static(b"# hi"),
        });
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.inferred_extension(), ".md");
    }

    #[tokio::test]
    async fn raw_bytes_default_to_uuid_dat() {
        let mut source = SourceDescriptor::Bytes(Bytes::from_static(b"abc"));
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.origin_filename, None);
        let name = resolved.raw_filename(None);
        assert!(name.ends_with(".dat"));
        assert!(Uuid::parse_str(name.trim_end_matches(".dat")).is_ok());
    }

    #[tokio::test]
    async fn path_source_uses_basename_and_stat_size() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello world").unwrap();
        let path = file.path().to_path_buf();

        let mut source = SourceDescriptor::Path(path.clone());
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.byte_length, 11);
        assert_eq!(resolved.content.as_ref(), b"hello world");
        assert_eq!(
            resolved.origin_filename.as_deref(),
            path.file_name().and_then(|n| n.to_str())
        );
        assert_eq!(resolved.origin_extension.as_deref(), Some(".txt"));
    }

    #[tokio::test]
    async fn missing_path_is_unsupported() {
        let mut source = SourceDescriptor::Path(PathBuf::from("/definitely/not/here.bin"));
        assert!(matches!(
            source.resolve().await,
            Err(ToolError::UnsupportedSource(_))
        ));
    }

    #[tokio::test]
    async fn stream_is_read_fully_and_position_restored() {
        let mut cursor = Cursor::new(b"0123456789".to_vec());
        cursor.set_position(4);
        let mut source = SourceDescriptor::Stream(StreamSource::new(cursor));

        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.content.as_ref(), b"0123456789");
        assert_eq!(resolved.byte_length, 10);
        assert_eq!(resolved.origin_filename, None);

        if let SourceDescriptor::Stream(stream) = &mut source {
            assert_eq!(stream.reader.stream_position().await.unwrap(), 4);
        } else {
            unreachable!();
        }
    }

    #[tokio::test]
    async fn stream_name_counts_only_when_path_exists() {
        let file = NamedTempFile::new().unwrap();
        let named = StreamSource::new(Cursor::new(b"x".to_vec())).with_name(file.path());
        let resolved = SourceDescriptor::Stream(named).resolve().await.unwrap();
        assert_eq!(
            resolved.origin_filename.as_deref(),
            file.path().file_name().and_then(|n| n.to_str())
        );

        let dangling = StreamSource::new(Cursor::new(b"x".to_vec())).with_name("/nope/ghost.png");
        let resolved = SourceDescriptor::Stream(dangling).resolve().await.unwrap();
        assert_eq!(resolved.origin_filename, None);
        assert_eq!(resolved.inferred_extension(), ".dat");
    }
}
