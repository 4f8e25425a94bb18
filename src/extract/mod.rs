//! Archive extraction with cooperative cancellation.
//!
//! The module is organized into two components:
//!
//! - [`archive`]: extraction of one archive into its destination directory
//! - [`cancel`]: a read wrapper that turns a cancellation signal into an
//!   early read failure
//!
//! Extraction is synchronous; async callers run it on the blocking pool via
//! [`unzip_file`] or through the batch dispatcher.

mod archive;
mod cancel;

pub use archive::extract_archive;
pub use cancel::CancelReader;

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

/// Extract a single archive on the blocking pool.
///
/// This is the ad-hoc, single-file counterpart of the batch path: same
/// extraction semantics, no manifest, no concurrency.
pub async fn unzip_file(path: &Path, password: &str, cancel: CancellationToken) -> Result<()> {
    let path = path.to_path_buf();
    let password = password.to_string();
    tokio::task::spawn_blocking(move || extract_archive(&path, &password, &cancel))
        .await
        .context("extraction task failed to run")?
}
