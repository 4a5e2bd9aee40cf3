//! Configuration module
//!
//! Binaries load the provider credentials and pipeline defaults from the
//! environment (optionally through a `.env` file). Hosts that inject
//! credentials per call deserialize [`StorageCredentials`] directly instead.

use std::env;
use std::str::FromStr;

use crate::backend::Backend;
use crate::models::{StorageCredentials, DEFAULT_MAX_RETRIES};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const BATCH_CONCURRENCY: usize = 4;

#[derive(Clone, Debug)]
pub struct ToolsConfig {
    pub credentials: StorageCredentials,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub batch_concurrency: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            credentials: StorageCredentials::default(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            batch_concurrency: BATCH_CONCURRENCY,
        }
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, anyhow::Error> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid value, got '{}'", name, raw)),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> Result<bool, anyhow::Error> {
    match var(name).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(anyhow::anyhow!("{} must be a boolean, got '{}'", name, v)),
    }
}

impl ToolsConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let backend = match var("OSSBRIDGE_BACKEND") {
            Some(raw) => raw.parse::<Backend>()?,
            None => Backend::default(),
        };
        let request_timeout_secs = parse_var("OSSBRIDGE_REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)?;

        let credentials = StorageCredentials {
            backend,
            endpoint: var("OSSBRIDGE_ENDPOINT").unwrap_or_default(),
            bucket: var("OSSBRIDGE_BUCKET").unwrap_or_default(),
            access_key_id: var("OSSBRIDGE_ACCESS_KEY_ID").unwrap_or_default(),
            access_key_secret: var("OSSBRIDGE_ACCESS_KEY_SECRET").unwrap_or_default(),
            region: var("OSSBRIDGE_REGION"),
            enable_verify_ssl: parse_bool("OSSBRIDGE_ENABLE_VERIFY_SSL", true)?,
            use_https: parse_bool("OSSBRIDGE_USE_HTTPS", true)?,
            request_timeout_secs: Some(request_timeout_secs),
            directory: None,
            filename: None,
        };

        let config = ToolsConfig {
            credentials,
            request_timeout_secs,
            max_retries: parse_var("OSSBRIDGE_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            batch_concurrency: parse_var("OSSBRIDGE_BATCH_CONCURRENCY", BATCH_CONCURRENCY)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sanity checks on pipeline knobs. Credential presence is checked by the
    /// credential validator, not here.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_retries == 0 {
            return Err(anyhow::anyhow!("OSSBRIDGE_MAX_RETRIES must be at least 1"));
        }
        if self.batch_concurrency == 0 {
            return Err(anyhow::anyhow!("OSSBRIDGE_BATCH_CONCURRENCY must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("OSSBRIDGE_REQUEST_TIMEOUT_SECS must be at least 1"));
        }
        Ok(())
    }
}
