//! The batch extraction pipeline.
//!
//! A batch runs in strictly separated stages, and validation failures in an
//! earlier stage stop the run before any later stage touches the
//! filesystem:
//!
//! 1. manifest reading and validation ([`crate::manifest`])
//! 2. job construction ([`build_jobs`], pure)
//! 3. precondition checks over every archive ([`check_jobs`])
//! 4. bounded-concurrency dispatch ([`run_batch`])
//!
//! Once dispatch begins the failure domain flips: extraction-stage errors
//! are job-local, and one archive's failure never prevents its siblings
//! from completing.

mod dispatch;
mod job;

pub use dispatch::run_batch;
pub use job::{ExtractionJob, build_jobs, check_jobs};

use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::manifest::read_manifest;

/// Extract every archive listed in the csv manifest, looked up under
/// `dir_path`, with at most `max_jobs` extractions in flight.
pub async fn unzip_dir(
    dir_path: &Path,
    csv_path: &Path,
    max_jobs: usize,
    cancel: CancellationToken,
) -> Result<()> {
    let rows = read_manifest(csv_path)?;
    let jobs = build_jobs(dir_path, &rows);
    check_jobs(&jobs).await?;
    run_batch(jobs, max_jobs, cancel).await
}
