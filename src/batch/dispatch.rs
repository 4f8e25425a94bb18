//! Bounded-concurrency dispatch of extraction jobs.
//!
//! Jobs are submitted in manifest order, each as its own task; a counting
//! permit pool (a [`Semaphore`] sized to the concurrency limit) keeps at
//! most that many extractions in flight at once, however large the batch.
//! Completion order is unconstrained — jobs write to disjoint destination
//! directories, so races between them are harmless.
//!
//! Each task hands its result back as an owned `(index, result)` value
//! through the [`JoinSet`], so no shared mutable error collection exists;
//! failures are re-ordered by submission index afterwards. Draining the set
//! is the completion barrier: every job has finished — and every permit has
//! been returned — before the batch call reports.
//!
//! Cancellation never skips submission. A job started after the signal
//! fires observes the token at its per-entry loop and records a
//! cancellation error without writing anything.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::job::ExtractionJob;
use crate::error::MultiError;
use crate::extract::extract_archive;

/// Run all jobs with at most `max_jobs` extractions in flight.
///
/// `max_jobs` must be at least 1. Returns once every job has finished,
/// successfully or not. Per-job failures are combined, in submission
/// order, into one batch error.
pub async fn run_batch(
    jobs: Vec<ExtractionJob>,
    max_jobs: usize,
    cancel: CancellationToken,
) -> Result<()> {
    let semaphore = Arc::new(Semaphore::new(max_jobs));
    let mut tasks: JoinSet<(usize, Result<()>)> = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let result = run_job(job, semaphore, cancel).await;
            (index, result)
        });
    }

    let mut failures: Vec<(usize, anyhow::Error)> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((index, Err(err))) => failures.push((index, err)),
            // A panicked task has no index to report under; sort it last.
            Err(err) => failures.push((usize::MAX, anyhow!("extraction task panicked: {err}"))),
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    failures.sort_by_key(|(index, _)| *index);
    let errs = failures.into_iter().map(|(_, err)| err).collect();
    Err(MultiError::blocks("failed to unzip files", errs).into())
}

async fn run_job(
    job: ExtractionJob,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
) -> Result<()> {
    // Held for the whole extraction; dropping it on any exit path below
    // frees the slot for the next queued job.
    let _permit = semaphore
        .acquire_owned()
        .await
        .context("concurrency limiter closed unexpectedly")?;
    tokio::task::spawn_blocking(move || extract_archive(&job.archive_path, &job.password, &cancel))
        .await
        .context("extraction task failed to run")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn empty_batch_succeeds() {
        run_batch(Vec::new(), 1, CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn more_jobs_than_permits_all_finish() {
        let dir = TempDir::new().unwrap();
        let mut jobs = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("file_{i}.zip"));
            build_zip(&path, &[("data.txt", "data")]);
            jobs.push(ExtractionJob {
                archive_path: path,
                password: String::new(),
            });
        }

        run_batch(jobs, 2, CancellationToken::new()).await.unwrap();

        for i in 0..5 {
            let extracted = dir.path().join(format!("file_{i}/data.txt"));
            assert_eq!(std::fs::read_to_string(extracted).unwrap(), "data");
        }
    }

    #[tokio::test]
    async fn failures_are_reported_in_submission_order() {
        let dir = TempDir::new().unwrap();
        let jobs = vec![
            ExtractionJob {
                archive_path: dir.path().join("first.zip"),
                password: String::new(),
            },
            ExtractionJob {
                archive_path: dir.path().join("second.zip"),
                password: String::new(),
            },
        ];

        let err = run_batch(jobs, 2, CancellationToken::new())
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to unzip files"));
        let first = msg.find("first.zip").unwrap();
        let second = msg.find("second.zip").unwrap();
        assert!(first < second);
    }
}
