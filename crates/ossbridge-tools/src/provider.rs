//! Credential validation for the OSS and TOS providers.
//!
//! A credential set is checked in two stages: required fields first, then one
//! read-only request against the bucket. Upload paths only run the first
//! stage; the probe happens when the host registers the credentials.

use std::sync::Arc;

use ossbridge_core::object_key::validate_key_segment;
use ossbridge_core::{StorageCredentials, ToolError, ToolResult};
use ossbridge_storage::{StorageError, StorageFactory};

/// First empty field, in the order the host form lists them
pub fn check_required(credentials: &StorageCredentials) -> ToolResult<()> {
    let fields: [(&'static str, &str); 4] = [
        ("endpoint", credentials.endpoint.as_str()),
        ("bucket", credentials.bucket.as_str()),
        ("access_key_id", credentials.access_key_id.as_str()),
        ("access_key_secret", credentials.access_key_secret.as_str()),
    ];

    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(ToolError::MissingCredential(*name)),
        None => Ok(()),
    }
}

/// Provider-level default directory and filename follow the key segment rules
pub fn check_defaults(credentials: &StorageCredentials) -> ToolResult<()> {
    if let Some(directory) = credentials.directory.as_deref() {
        validate_key_segment("Directory", directory)?;
    }
    if let Some(filename) = credentials.filename.as_deref() {
        validate_key_segment("Filename", filename)?;
    }
    Ok(())
}

/// Human-readable message for a failed probe
fn probe_failure(err: StorageError, bucket: &str) -> ToolError {
    let code = err.code().map(str::to_string);
    let message = match code.as_deref() {
        Some("InvalidAccessKeyId") => "Invalid Access Key ID".to_string(),
        Some("SignatureDoesNotMatch") => {
            "Signature verification failed, please check that the Secret Access Key is correct"
                .to_string()
        }
        Some("AccessDenied") => "Access denied, please check the credential permissions".to_string(),
        Some("NoSuchBucket") => format!("Bucket does not exist: {}", bucket),
        _ => format!("Credential validation failed: {}", err),
    };
    ToolError::CredentialValidation { code, message }
}

pub struct CredentialValidator {
    factory: Arc<dyn StorageFactory>,
}

impl CredentialValidator {
    pub fn new(factory: Arc<dyn StorageFactory>) -> Self {
        Self { factory }
    }

    /// Field checks followed by exactly one bucket probe
    pub async fn validate(&self, credentials: &StorageCredentials) -> ToolResult<()> {
        check_required(credentials)?;
        check_defaults(credentials)?;

        let storage = self
            .factory
            .connect(credentials)
            .map_err(|e| probe_failure(e, &credentials.bucket))?;

        storage
            .probe_bucket()
            .await
            .map_err(|e| probe_failure(e, &credentials.bucket))?;

        tracing::info!(
            backend = %credentials.backend,
            bucket = %credentials.bucket,
            endpoint = %credentials.endpoint_host(),
            "Credentials validated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ossbridge_core::Backend;
    use ossbridge_storage::MemoryStorageFactory;

    fn creds() -> StorageCredentials {
        StorageCredentials::new(
            Backend::VolcengineTos,
            "tos-cn-beijing.volces.com",
            "media",
            "AKID",
            "secret",
        )
    }

    #[test]
    fn reports_first_missing_field_in_order() {
        let mut c = creds();
        c.bucket.clear();
        c.access_key_secret.clear();
        assert!(matches!(
            check_required(&c),
            Err(ToolError::MissingCredential("bucket"))
        ));

        let mut c = creds();
        c.endpoint = "  ".to_string();
        assert_eq!(
            check_required(&c).unwrap_err().to_string(),
            "Missing required credential: endpoint"
        );
    }

    #[test]
    fn default_directory_is_format_checked() {
        let mut c = creds();
        c.directory = Some("/uploads".to_string());
        assert!(matches!(check_defaults(&c), Err(ToolError::Validation(_))));
        c.directory = Some("uploads".to_string());
        c.filename = Some(" name.png".to_string());
        assert!(matches!(check_defaults(&c), Err(ToolError::Validation(_))));
    }

    #[test]
    fn probe_failures_map_to_messages() {
        let err = probe_failure(
            StorageError::backend(Some("SignatureDoesNotMatch".to_string()), "403"),
            "media",
        );
        assert_eq!(err.code(), Some("SignatureDoesNotMatch"));
        assert!(err.to_string().contains("Secret Access Key"));

        let err = probe_failure(
            StorageError::backend(Some("NoSuchBucket".to_string()), "404"),
            "media",
        );
        assert_eq!(err.to_string(), "Bucket does not exist: media");

        let err = probe_failure(StorageError::backend(None, "connection refused"), "media");
        assert_eq!(
            err.to_string(),
            "Credential validation failed: connection refused"
        );
    }

    #[tokio::test]
    async fn valid_credentials_pass_probe() {
        let validator = CredentialValidator::new(Arc::new(MemoryStorageFactory::new()));
        assert!(validator.validate(&creds()).await.is_ok());
    }
}
