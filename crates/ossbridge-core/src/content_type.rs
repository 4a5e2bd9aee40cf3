//! Content-type resolution in both directions.
//!
//! Both tables are ordered slices: the MIME-to-extension prefix fallback picks
//! the first matching entry in declaration order, so reordering entries
//! changes behavior.

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const DEFAULT_EXTENSION: &str = ".dat";

/// Extension to MIME type.
const EXTENSION_TO_MIME: &[(&str, &str)] = &[
    // Images
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".bmp", "image/bmp"),
    (".webp", "image/webp"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".tiff", "image/tiff"),
    (".heic", "image/heic"),
    // Documents
    (".txt", "text/plain"),
    (".pdf", "application/pdf"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (".ppt", "application/vnd.ms-powerpoint"),
    (
        ".pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    (".md", "text/markdown"),
    // Audio
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".ogg", "audio/ogg"),
    (".flac", "audio/flac"),
    (".aac", "audio/aac"),
    (".m4a", "audio/m4a"),
    // Video
    (".mp4", "video/mp4"),
    (".avi", "video/x-msvideo"),
    (".mov", "video/quicktime"),
    (".wmv", "video/x-ms-wmv"),
    (".flv", "video/x-flv"),
    (".mkv", "video/x-matroska"),
    (".webm", "video/webm"),
    (".mpg", "video/mpeg"),
    // Archives
    (".zip", "application/zip"),
    (".rar", "application/vnd.rar"),
    (".7z", "application/x-7z-compressed"),
    (".tar", "application/x-tar"),
    (".gz", "application/gzip"),
    // Code
    (".py", "text/x-python"),
    (".js", "application/javascript"),
    (".css", "text/css"),
    (".html", "text/html"),
    (".htm", "text/html"),
    (".xml", "application/xml"),
    (".json", "application/json"),
    // Other
    (".csv", "text/csv"),
    (".rtf", "application/rtf"),
];

/// MIME type to extension.
const MIME_TO_EXTENSION: &[(&str, &str)] = &[
    // Images
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/bmp", ".bmp"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("image/tiff", ".tiff"),
    ("image/x-icon", ".ico"),
    ("image/heic", ".heic"),
    // Audio
    ("audio/mpeg", ".mp3"),
    ("audio/wav", ".wav"),
    ("audio/ogg", ".ogg"),
    ("audio/flac", ".flac"),
    ("audio/aac", ".aac"),
    ("audio/m4a", ".m4a"),
    ("audio/mp4", ".mp4"),
    // Video
    ("video/mp4", ".mp4"),
    ("video/mov", ".mov"),
    ("video/quicktime", ".mov"),
    ("video/avi", ".avi"),
    ("video/x-msvideo", ".avi"),
    ("video/x-ms-wmv", ".wmv"),
    ("video/x-flv", ".flv"),
    ("video/x-matroska", ".mkv"),
    ("video/webm", ".webm"),
    ("video/mpeg", ".mpg"),
    // Documents
    ("application/pdf", ".pdf"),
    ("application/msword", ".doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    ("application/vnd.ms-excel", ".xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    ("application/vnd.ms-powerpoint", ".ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    ("application/rtf", ".rtf"),
    // Text
    ("text/plain", ".txt"),
    ("text/csv", ".csv"),
    ("application/json", ".json"),
    ("application/xml", ".xml"),
    ("text/html", ".html"),
    ("text/css", ".css"),
    ("application/javascript", ".js"),
    ("text/markdown", ".md"),
    ("text/x-python", ".py"),
    // Archives
    ("application/zip", ".zip"),
    ("application/gzip", ".gz"),
    ("application/x-rar-compressed", ".rar"),
    ("application/vnd.rar", ".rar"),
    ("application/x-7z-compressed", ".7z"),
    ("application/x-tar", ".tar"),
];

/// Coarse file categories for content types, checked by prefix in order.
const MIME_TO_FILE_TYPE: &[(&str, &str)] = &[
    ("image/", "image"),
    ("audio/", "audio"),
    ("video/", "video"),
    ("application/pdf", "pdf"),
    ("text/", "text"),
    ("application/json", "json"),
    ("application/xml", "xml"),
];

/// Map a file extension (with or without the leading dot, any case) to its MIME type.
pub fn mime_from_extension(extension: &str) -> &'static str {
    let lowered = extension.trim().to_lowercase();
    let needle = if lowered.starts_with('.') {
        lowered
    } else {
        format!(".{}", lowered)
    };

    EXTENSION_TO_MIME
        .iter()
        .find(|(ext, _)| *ext == needle)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Map a MIME type to a file extension, including the leading dot.
///
/// Exact match first, then the first table entry that is a prefix of `mime`
/// (so `text/plain; charset=utf-8` resolves to `.txt`), then `.dat`.
pub fn extension_from_mime(mime: &str) -> &'static str {
    if let Some((_, ext)) = MIME_TO_EXTENSION.iter().find(|(ct, _)| *ct == mime) {
        return *ext;
    }

    MIME_TO_EXTENSION
        .iter()
        .find(|(ct, _)| mime.starts_with(ct))
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Coarse category of a content type (`image`, `audio`, `video`, `pdf`, `text`, `json`, `xml`).
pub fn file_type_from_mime(mime: &str) -> Option<&'static str> {
    MIME_TO_FILE_TYPE
        .iter()
        .find(|(prefix, _)| mime.starts_with(prefix))
        .map(|(_, file_type)| *file_type)
}

/// Split a filename into `(stem, extension)`, the extension keeping its dot.
///
/// Only the last path segment is considered and leading dots do not start an
/// extension: `archive.tar.gz` -> (`archive.tar`, `.gz`), `.bashrc` -> (`.bashrc`, ``).
pub fn split_extension(name: &str) -> (&str, &str) {
    let segment_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    let segment = &name[segment_start..];

    match segment.rfind('.') {
        Some(dot) if segment[..dot].chars().any(|c| c != '.') => {
            let split_at = segment_start + dot;
            (&name[..split_at], &name[split_at..])
        }
        _ => (name, ""),
    }
}
