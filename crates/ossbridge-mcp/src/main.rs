//! ossbridge MCP Server
//!
//! Run with: OSSBRIDGE_ENDPOINT=xxx OSSBRIDGE_BUCKET=xxx OSSBRIDGE_ACCESS_KEY_ID=xxx \
//! OSSBRIDGE_ACCESS_KEY_SECRET=xxx ossbridge-mcp

use anyhow::Context;
use ossbridge_core::ToolsConfig;
use ossbridge_mcp::OssBridgeService;
use ossbridge_tools::ToolService;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ToolsConfig::from_env().context("Failed to load OSSBRIDGE_* configuration")?;
    tracing::info!(
        backend = %config.credentials.backend,
        bucket = %config.credentials.bucket,
        "Starting ossbridge MCP server"
    );

    let service = OssBridgeService::new(ToolService::from_config(config));
    let running = service.serve(stdio()).await.context("MCP transport failed")?;
    running.waiting().await.context("MCP server error")?;

    Ok(())
}
