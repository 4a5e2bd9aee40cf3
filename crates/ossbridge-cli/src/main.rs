//! ossbridge CLI: upload to and download from Aliyun OSS or Volcengine TOS.
//!
//! Credentials come from OSSBRIDGE_* environment variables (or a .env file).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ossbridge_cli::{init_tracing, output_path};
use ossbridge_core::{SourceDescriptor, ToolsConfig, UploadRequest};
use ossbridge_tools::{params, summary, DownloadRequest, ToolService};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ossbridge", about = "Object storage upload/download CLI")]
struct Cli {
    /// Print the prose summary instead of JSON
    #[arg(long, global = true)]
    summary: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Target directory inside the bucket
        #[arg(long)]
        directory: Option<String>,
        /// no_subdirectory, yyyy_mm_dd_hierarchy or yyyy_mm_dd_combined
        #[arg(long)]
        directory_mode: Option<String>,
        /// Name to store the file under
        #[arg(long)]
        filename: Option<String>,
        /// filename, random or filename_timestamp
        #[arg(long)]
        filename_mode: Option<String>,
        /// Total write attempts
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Upload up to 10 local files
    MultiUpload {
        /// Paths of the files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        directory: Option<String>,
        #[arg(long)]
        directory_mode: Option<String>,
        #[arg(long)]
        filename_mode: Option<String>,
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Download an object by URL or key
    Get {
        /// Object URL: https://{bucket}.{endpoint}/{key}
        #[arg(long, conflicts_with = "object_key")]
        url: Option<String>,
        /// Object key in the configured bucket
        #[arg(long)]
        object_key: Option<String>,
        /// Output file or directory (default: object name in the working directory)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Name for the downloaded file
        #[arg(long)]
        filename: Option<String>,
    },
    /// Check the configured credentials against the bucket
    Validate,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn upload_request(
    config: &ToolsConfig,
    directory: Option<String>,
    directory_mode: Option<&str>,
    filename: Option<String>,
    filename_mode: Option<&str>,
    max_retries: Option<u32>,
) -> anyhow::Result<UploadRequest> {
    Ok(UploadRequest {
        directory,
        directory_mode: params::parse_directory_mode(directory_mode)?,
        filename,
        filename_mode: params::parse_filename_mode(filename_mode)?,
        max_retries: max_retries.unwrap_or(config.max_retries),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ToolsConfig::from_env().context(
        "Failed to load configuration. Set OSSBRIDGE_ENDPOINT, OSSBRIDGE_BUCKET, \
         OSSBRIDGE_ACCESS_KEY_ID and OSSBRIDGE_ACCESS_KEY_SECRET",
    )?;
    let credentials = config.credentials.clone();
    let concurrency = config.batch_concurrency;
    let service = ToolService::from_config(config);

    match cli.command {
        Commands::Upload {
            file,
            directory,
            directory_mode,
            filename,
            filename_mode,
            max_retries,
        } => {
            let request = upload_request(
                &service.config,
                directory,
                directory_mode.as_deref(),
                filename,
                filename_mode.as_deref(),
                max_retries,
            )?;
            let mut source = SourceDescriptor::Path(file);
            let result = service
                .uploader
                .upload(&mut source, &request, &credentials)
                .await?;
            if cli.summary {
                println!("{}", summary::upload_summary(&result));
            } else {
                print_json(&result)?;
            }
        }
        Commands::MultiUpload {
            files,
            directory,
            directory_mode,
            filename_mode,
            max_retries,
        } => {
            let request = upload_request(
                &service.config,
                directory,
                directory_mode.as_deref(),
                None,
                filename_mode.as_deref(),
                max_retries,
            )?;
            let sources = files.into_iter().map(SourceDescriptor::Path).collect();
            let result = service
                .uploader
                .upload_batch(sources, &request, &credentials, concurrency)
                .await?;
            if cli.summary {
                println!("{}", summary::batch_summary(&result));
            } else {
                print_json(&result)?;
            }
            if result.error_count > 0 {
                anyhow::bail!("{} of {} files failed", result.error_count, result.files.len());
            }
        }
        Commands::Get {
            url,
            object_key,
            out,
            filename,
        } => {
            let request = DownloadRequest {
                url,
                object_key,
                filename,
                ..DownloadRequest::default()
            };
            let result = service.downloader.download(&request, &credentials).await?;
            let path = output_path(out.as_deref(), &result.filename);
            tokio::fs::write(&path, &result.content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            if cli.summary {
                println!("{}", summary::download_summary(&result));
                println!("Saved to: {}", path.display());
            } else {
                print_json(&serde_json::json!({
                    "status": result.status,
                    "filename": result.filename,
                    "object_key": result.object_key,
                    "bucket": result.bucket,
                    "endpoint": result.endpoint,
                    "file_size": result.file_size,
                    "content_type": result.content_type,
                    "file_type": result.file_type,
                    "saved_to": path.display().to_string(),
                }))?;
            }
        }
        Commands::Validate => {
            service.validator.validate(&credentials).await?;
            print_json(&serde_json::json!({
                "valid": true,
                "backend": credentials.backend,
                "bucket": credentials.bucket,
                "endpoint": credentials.endpoint_host(),
            }))?;
        }
    }

    Ok(())
}
