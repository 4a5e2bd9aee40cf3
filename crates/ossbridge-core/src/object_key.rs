//! Object key construction.
//!
//! Key format: `[{directory}/][{date path}/]{filename}`, `/`-separated and
//! never starting with `/`. Every surface builds keys through
//! [`ObjectKeyBuilder`] so uploads land in the same layout regardless of how
//! they were invoked.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::content_type::split_extension;
use crate::error::{ToolError, ToolResult};
use crate::models::{DirectoryMode, FilenameMode};

/// A normalized storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Final path segment of the key
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reject values that start with a space, `/` or `\`.
///
/// Empty values are accepted: an empty directory means the bucket root.
pub fn validate_key_segment(label: &str, value: &str) -> ToolResult<()> {
    if value.starts_with([' ', '/', '\\']) {
        return Err(ToolError::Validation(format!(
            "{} cannot start with space, / or \\",
            label
        )));
    }
    Ok(())
}

/// Date-derived directory segment for `now`
pub fn date_path(mode: DirectoryMode, now: &NaiveDateTime) -> String {
    match mode {
        DirectoryMode::None => String::new(),
        DirectoryMode::YyyyMmDdHierarchy => now.format("%Y/%m/%d").to_string(),
        DirectoryMode::YyyyMmDdCombined => now.format("%Y%m%d").to_string(),
    }
}

/// Apply a filename mode to an already-resolved filename
pub fn apply_filename_mode(filename: &str, mode: FilenameMode, now: &NaiveDateTime) -> String {
    match mode {
        FilenameMode::AsGiven => filename.to_string(),
        FilenameMode::Random => {
            let (_, extension) = split_extension(filename);
            format!("{}{}", Uuid::new_v4(), extension)
        }
        FilenameMode::Timestamped => {
            let (stem, extension) = split_extension(filename);
            // %3f truncates to milliseconds
            let timestamp = now.format("%Y%m%d%H%M%S%3f");
            format!("{}_{}{}", stem, timestamp, extension)
        }
    }
}

/// Builds object keys from a directory, a filename, and the two layout modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectKeyBuilder {
    pub directory_mode: DirectoryMode,
    pub filename_mode: FilenameMode,
}

impl ObjectKeyBuilder {
    pub fn new(directory_mode: DirectoryMode, filename_mode: FilenameMode) -> Self {
        Self {
            directory_mode,
            filename_mode,
        }
    }

    /// Validate and normalize a directory: separators become `/`, empty
    /// segments and trailing whitespace are dropped.
    pub fn normalize_directory(directory: &str) -> ToolResult<String> {
        validate_key_segment("Directory", directory)?;
        normalize_segments(directory.trim_end())
    }

    /// Directory plus date segment, without leading or trailing `/`
    pub fn full_directory(&self, directory: &str, now: &NaiveDateTime) -> ToolResult<String> {
        let directory = Self::normalize_directory(directory)?;
        let date_path = date_path(self.directory_mode, now);

        Ok(match (directory.is_empty(), date_path.is_empty()) {
            (_, true) => directory,
            (true, false) => date_path,
            (false, false) => format!("{}/{}", directory, date_path),
        })
    }

    /// Final filename after the filename mode is applied
    pub fn final_filename(&self, raw_filename: &str, now: &NaiveDateTime) -> ToolResult<String> {
        validate_key_segment("Filename", raw_filename)?;
        if raw_filename.trim().is_empty() {
            return Err(ToolError::validation("Filename cannot be empty"));
        }
        Ok(apply_filename_mode(raw_filename, self.filename_mode, now))
    }

    /// Build the key for `raw_filename` under `directory` at time `now`
    pub fn build(
        &self,
        directory: &str,
        raw_filename: &str,
        now: &NaiveDateTime,
    ) -> ToolResult<ObjectKey> {
        let full_directory = self.full_directory(directory, now)?;
        let filename = self.final_filename(raw_filename, now)?;
        Self::join(&full_directory, &filename)
    }

    /// Join a normalized directory and a final filename into a key
    pub fn join(full_directory: &str, filename: &str) -> ToolResult<ObjectKey> {
        let key = normalize_segments(&format!("{}/{}", full_directory, filename))?;
        if key.is_empty() {
            return Err(ToolError::validation("Object key cannot be empty"));
        }
        Ok(ObjectKey(key))
    }
}

/// `/`-join the non-empty segments of `path`, treating `\` as a separator.
///
/// `.` and `..` segments are rejected: storage clients resolve or escape them,
/// so the stored key would differ from the reported one.
fn normalize_segments(path: &str) -> ToolResult<String> {
    let mut segments = Vec::new();
    for segment in path.split(['/', '\\']).filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(ToolError::Validation(format!(
                "Object key segments cannot be '.' or '..': {}",
                path
            )));
        }
        segments.push(segment);
    }
    Ok(segments.join("/"))
}
