use std::path::{Path, PathBuf};

/// Where a downloaded object is written: into `out` when it is a directory,
/// to `out` itself otherwise, or under its own name in the working directory.
pub fn output_path(out: Option<&Path>, filename: &str) -> PathBuf {
    match out {
        Some(dir) if dir.is_dir() => dir.join(filename),
        Some(file) => file.to_path_buf(),
        None => PathBuf::from(filename),
    }
}


/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
