use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Supported object storage vendors
///
/// Both speak the S3 protocol; the vendor decides how a signing region is
/// derived from the endpoint and which host serves the S3 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    AliyunOss,
    #[default]
    VolcengineTos,
}

impl Backend {
    /// Derive the signing region from an endpoint host.
    ///
    /// TOS: `tos-cn-beijing.volces.com` -> `cn-beijing`.
    /// OSS: `oss-cn-hangzhou.aliyuncs.com` -> `oss-cn-hangzhou`.
    pub fn region_from_endpoint(&self, endpoint: &str) -> Option<String> {
        let host = endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let (first_label, _) = host.split_once('.')?;
        let region = match self {
            Backend::VolcengineTos => first_label
                .trim_start_matches("tos-s3-")
                .replace("tos-", ""),
            Backend::AliyunOss => first_label.to_string(),
        };
        if region.is_empty() {
            None
        } else {
            Some(region)
        }
    }

    /// Endpoint host the S3 client talks to.
    ///
    /// TOS serves its S3-compatible API on `tos-s3-<region>` hosts; the
    /// native `tos-<region>` host stays in use for public URLs. OSS serves
    /// both on the same host.
    pub fn s3_endpoint(&self, endpoint_host: &str) -> String {
        match self {
            Backend::VolcengineTos
                if endpoint_host.starts_with("tos-") && !endpoint_host.starts_with("tos-s3-") =>
            {
                format!("tos-s3-{}", &endpoint_host["tos-".len()..])
            }
            _ => endpoint_host.to_string(),
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aliyun_oss" | "aliyun" | "oss" => Ok(Backend::AliyunOss),
            "volcengine_tos" | "volcengine" | "tos" => Ok(Backend::VolcengineTos),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Backend::AliyunOss => write!(f, "aliyun_oss"),
            Backend::VolcengineTos => write!(f, "volcengine_tos"),
        }
    }
}
