//! Virtual-hosted-style object URLs: `scheme://bucket.endpoint/key`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ToolError, ToolResult};
use crate::models::{endpoint_host, ParsedObjectUrl};

static OBJECT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^.]+)\.([^/]+)(/(.*))?$").expect("object URL pattern is valid")
});

/// Bytes escaped in the path of a public URL; `/` stays a separator
const KEY_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Split an object URL into bucket, endpoint and percent-decoded key.
///
/// Path-style URLs (`endpoint/bucket/key`) are not recognized.
pub fn parse_object_url(url: &str) -> ToolResult<ParsedObjectUrl> {
    let captures = OBJECT_URL
        .captures(url)
        .ok_or_else(|| ToolError::InvalidUrlFormat(url.to_string()))?;

    let object_key = captures
        .get(4)
        .map(|m| percent_decode_str(m.as_str()).decode_utf8_lossy().into_owned())
        .unwrap_or_default();

    Ok(ParsedObjectUrl {
        bucket: captures[1].to_string(),
        endpoint: captures[2].to_string(),
        object_key,
    })
}

/// Public URL of an object: `{scheme}://{bucket}.{endpoint}/{key}`, with the
/// key percent-encoded so [`parse_object_url`] recovers it exactly.
pub fn public_object_url(scheme: &str, bucket: &str, endpoint: &str, key: &str) -> String {
    format!(
        "{}://{}.{}/{}",
        scheme,
        bucket,
        endpoint_host(endpoint),
        utf8_percent_encode(key, KEY_PATH)
    )
}
