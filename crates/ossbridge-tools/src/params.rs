//! Decoding of host-supplied tool parameters.
//!
//! Hosts pass files as JSON. The shape decides the source variant once, here;
//! the pipeline never looks at the raw value again.

use base64::Engine;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::PathBuf;

use ossbridge_core::{
    DirectoryMode, FilenameMode, SourceDescriptor, StructuredUpload, ToolError, ToolResult,
};

fn decode_base64(field: &str, encoded: &str) -> ToolResult<Bytes> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map(Bytes::from)
        .map_err(|e| ToolError::UnsupportedSource(format!("'{}' is not valid base64: {}", field, e)))
}

fn string_field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| object.get(*name).and_then(Value::as_str))
        .filter(|value| !value.trim().is_empty())
}

/// Decode one `file` parameter.
///
/// - a string is a local path
/// - `{ "blob" | "data": base64, "filename" | "name"?, "mime_type" | "content_type"? }`
///   is a structured upload
/// - `{ "bytes": base64 }` is raw content without a name
pub fn source_from_value(value: &Value) -> ToolResult<SourceDescriptor> {
    match value {
        Value::String(path) if !path.trim().is_empty() => Ok(SourceDescriptor::Path(PathBuf::from(path))),
        Value::Object(object) => {
            let blob_field = ["blob", "data"]
                .into_iter()
                .find(|name| object.get(*name).is_some_and(Value::is_string));

            if let Some(field) = blob_field {
                let encoded = object.get(field).and_then(Value::as_str).unwrap_or_default();
                return Ok(SourceDescriptor::Structured(StructuredUpload {
                    filename: string_field(object, &["filename", "name"]).map(str::to_string),
                    content_type: string_field(object, &["mime_type", "content_type"])
                        .map(str::to_string),
                    blob: decode_base64(field, encoded)?,
                }));
            }

            match object.get("bytes").and_then(Value::as_str) {
                Some(encoded) => Ok(SourceDescriptor::Bytes(decode_base64("bytes", encoded)?)),
                None => Err(ToolError::UnsupportedSource(
                    "expected 'blob', 'data' or 'bytes' in file object".to_string(),
                )),
            }
        }
        other => Err(ToolError::UnsupportedSource(format!(
            "expected a file path or a file object, got {}",
            json_kind(other)
        ))),
    }
}

/// Decode the `files` parameter of a multi-upload
pub fn sources_from_value(value: &Value) -> ToolResult<Vec<SourceDescriptor>> {
    match value {
        Value::Array(items) => items.iter().map(source_from_value).collect(),
        single => Ok(vec![source_from_value(single)?]),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "an empty string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_wire_name<T: DeserializeOwned + Default>(label: &str, raw: Option<&str>) -> ToolResult<T> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(T::default()),
        Some(name) => serde_json::from_value(Value::String(name.to_string()))
            .map_err(|_| ToolError::validation(format!("Invalid {}: {}", label, name))),
    }
}

/// `no_subdirectory` | `yyyy_mm_dd_hierarchy` | `yyyy_mm_dd_combined`
pub fn parse_directory_mode(raw: Option<&str>) -> ToolResult<DirectoryMode> {
    parse_wire_name("directory_mode", raw)
}

/// `filename` | `random` | `filename_timestamp`
pub fn parse_filename_mode(raw: Option<&str>) -> ToolResult<FilenameMode> {
    parse_wire_name("filename_mode", raw)
}
