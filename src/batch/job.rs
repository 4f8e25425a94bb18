use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};

use crate::error::MultiError;
use crate::manifest::ManifestRow;

/// One archive's extraction task: where the archive lives and how to open
/// it. Owns no resources and never changes once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub archive_path: PathBuf,
    /// Password for the archive; empty when none is needed.
    pub password: String,
}

/// Build one job per manifest row, in row order, by joining the batch
/// directory with each row's filename. Pure; the filesystem is not
/// consulted here.
pub fn build_jobs(dir_path: &Path, rows: &[ManifestRow]) -> Vec<ExtractionJob> {
    rows.iter()
        .map(|row| ExtractionJob {
            archive_path: dir_path.join(&row.filename),
            password: row.password.clone(),
        })
        .collect()
}

/// Confirm every job's archive exists and is a regular file.
///
/// All violations across all jobs are collected before failing, each tagged
/// with the archive path and its 1-based manifest line. Any failure here
/// means no extraction begins for the batch.
pub async fn check_jobs(jobs: &[ExtractionJob]) -> Result<()> {
    let mut errs: Vec<anyhow::Error> = Vec::new();
    for (i, job) in jobs.iter().enumerate() {
        if let Err(err) = check_job(job).await {
            errs.push(anyhow!(
                "failed to validate zip file '{}' from line {}: {err:#}",
                job.archive_path.display(),
                i + 2,
            ));
        }
    }
    if !errs.is_empty() {
        return Err(MultiError::bulleted("failed to validate zip files in csv file", errs).into());
    }
    Ok(())
}

async fn check_job(job: &ExtractionJob) -> Result<()> {
    let metadata = match tokio::fs::metadata(&job.archive_path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            bail!("zip file doesn't exist")
        }
        Err(err) => return Err(err.into()),
    };
    if !metadata.is_file() {
        bail!("zip file is not a regular file");
    }
    Ok(())
}
