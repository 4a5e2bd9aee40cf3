//! MCP server using rmcp SDK
//!
//! Exposes the ossbridge tools over stdio. Every tool answers with two text
//! items: the structured result as JSON, then a prose summary. Tool failures
//! come back as `isError` results carrying an `Operation failed: ...` message;
//! protocol-level errors are reserved for serialization problems.

use crate::tools::*;
use ossbridge_core::{ErrorMetadata, LogLevel, StorageCredentials, ToolError, ToolResult, UploadRequest};
use ossbridge_tools::{
    params, summary, BatchUploadResult, DownloadRequest, DownloadResult, ToolService, UploadResult,
};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

fn text_content(s: impl Into<String>) -> Content {
    Content {
        raw: RawContent::Text(RawTextContent { text: s.into() }),
        annotations: None,
    }
}

fn success<T: Serialize>(result: &T, summary: String) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string(result).map_err(|e| ErrorData {
        code: ErrorCode(-32603),
        message: Cow::from(e.to_string()),
        data: None,
    })?;
    Ok(CallToolResult::success(vec![
        text_content(text),
        text_content(summary),
    ]))
}

fn failure(tool: &'static str, err: ToolError) -> Result<CallToolResult, ErrorData> {
    let error_code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(tool, error_code, error = %err, "Tool call rejected"),
        LogLevel::Warn => tracing::warn!(tool, error_code, error = %err, "Tool call rejected"),
        LogLevel::Error => tracing::error!(tool, error_code, error = %err, "Tool call failed"),
    }
    Ok(CallToolResult::error(vec![text_content(
        summary::failure_message(&err),
    )]))
}

#[derive(Clone)]
pub struct OssBridgeService {
    tools: Arc<ToolService>,
    tool_router: ToolRouter<OssBridgeService>,
}

#[tool_router]
impl OssBridgeService {
    pub fn new(tools: ToolService) -> Self {
        Self {
            tools: Arc::new(tools),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Upload one file to the configured OSS/TOS bucket and return its URL")]
    async fn upload_file(
        &self,
        Parameters(req): Parameters<UploadFileRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.run_upload(req).await {
            Ok(result) => success(&result, summary::upload_summary(&result)),
            Err(e) => failure("upload_file", e),
        }
    }

    #[tool(description = "Upload up to 10 files with shared directory and naming options")]
    async fn multi_upload_files(
        &self,
        Parameters(req): Parameters<MultiUploadFilesRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.run_multi_upload(req).await {
            Ok(result) => success(&result, summary::batch_summary(&result)),
            Err(e) => failure("multi_upload_files", e),
        }
    }

    #[tool(description = "Download an object by its public URL or by object key")]
    async fn get_file_by_url(
        &self,
        Parameters(req): Parameters<GetFileByUrlRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.run_download(req).await {
            Ok(result) => success(&result, summary::download_summary(&result)),
            Err(e) => failure("get_file_by_url", e),
        }
    }

    #[tool(description = "Check storage credentials with one read-only request against the bucket")]
    async fn validate_credentials(
        &self,
        Parameters(req): Parameters<ValidateCredentialsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.run_validate(req).await {
            Ok(credentials) => success(
                &serde_json::json!({
                    "valid": true,
                    "backend": credentials.backend,
                    "bucket": credentials.bucket,
                    "endpoint": credentials.endpoint_host(),
                }),
                format!(
                    "Credentials are valid for bucket {} at {}",
                    credentials.bucket,
                    credentials.endpoint_host()
                ),
            ),
            Err(e) => failure("validate_credentials", e),
        }
    }
}

impl OssBridgeService {
    /// Configured credentials with the call's overrides applied
    fn credentials(
        &self,
        overrides: Option<CredentialsParam>,
        request_timeout: Option<u64>,
    ) -> ToolResult<StorageCredentials> {
        let base = &self.tools.config.credentials;
        let mut credentials = match overrides {
            Some(param) => param.apply(base)?,
            None => base.clone(),
        };
        if let Some(secs) = request_timeout.filter(|s| *s > 0) {
            credentials.request_timeout_secs = Some(secs);
        }
        Ok(credentials)
    }

    async fn run_upload(&self, req: UploadFileRequest) -> ToolResult<UploadResult> {
        let credentials = self.credentials(req.credentials, req.request_timeout)?;
        let request = UploadRequest {
            directory: req.directory,
            directory_mode: params::parse_directory_mode(req.directory_mode.as_deref())?,
            filename: req.filename,
            filename_mode: params::parse_filename_mode(req.filename_mode.as_deref())?,
            max_retries: req.max_retries.unwrap_or(self.tools.config.max_retries),
        };
        let mut source = params::source_from_value(&req.file)?;

        self.tools
            .uploader
            .upload(&mut source, &request, &credentials)
            .await
    }

    async fn run_multi_upload(&self, req: MultiUploadFilesRequest) -> ToolResult<BatchUploadResult> {
        let credentials = self.credentials(req.credentials, req.request_timeout)?;
        let request = UploadRequest {
            directory: req.directory,
            directory_mode: params::parse_directory_mode(req.directory_mode.as_deref())?,
            filename: None,
            filename_mode: params::parse_filename_mode(req.filename_mode.as_deref())?,
            max_retries: req.max_retries.unwrap_or(self.tools.config.max_retries),
        };
        let sources = params::sources_from_value(&req.files)?;

        self.tools
            .uploader
            .upload_batch(
                sources,
                &request,
                &credentials,
                self.tools.config.batch_concurrency,
            )
            .await
    }

    async fn run_download(&self, req: GetFileByUrlRequest) -> ToolResult<DownloadResult> {
        let request = DownloadRequest {
            url: req.url,
            object_key: req.object_key,
            bucket: req.bucket,
            endpoint: req.endpoint,
            filename: req.filename,
            access_key_id: req.access_key_id,
            access_key_secret: req.access_key_secret,
        };
        self.tools
            .downloader
            .download(&request, &self.tools.config.credentials)
            .await
    }

    async fn run_validate(&self, req: ValidateCredentialsRequest) -> ToolResult<StorageCredentials> {
        let mut credentials = self.credentials(req.credentials, None)?;
        credentials.directory = req.directory;
        credentials.filename = req.filename;
        self.tools.validator.validate(&credentials).await?;
        Ok(credentials)
    }
}

#[tool_handler]
impl ServerHandler for OssBridgeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ossbridge-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "ossbridge MCP: upload files (single or up to 10 at once) to Aliyun OSS or \
                 Volcengine TOS, download objects by URL or key, and validate credentials. \
                 Configure with OSSBRIDGE_ENDPOINT, OSSBRIDGE_BUCKET, OSSBRIDGE_ACCESS_KEY_ID \
                 and OSSBRIDGE_ACCESS_KEY_SECRET."
                    .to_string(),
            ),
        }
    }
}
