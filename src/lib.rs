//! # batchzip
//!
//! A batch unzip utility driven by a CSV manifest.
//!
//! This library extracts password-protectable zip archives from a
//! directory, where a CSV manifest maps each archive's filename to the
//! password needed to open it (empty for none). The manifest is fully
//! validated up front — every shape violation is reported at once — and
//! archives are then extracted concurrently under a fixed concurrency
//! ceiling, each into a directory named after the archive itself. A single
//! cancellation token stops in-flight copies at their next read boundary.
//!
//! ## Features
//!
//! - CSV manifest validation reporting every offending line in one pass
//! - Bounded-concurrency batch extraction with per-archive failure isolation
//! - ZipCrypto-protected archives via per-archive passwords
//! - Whole-archive path-traversal rejection before anything is written
//! - Cooperative cancellation that never corrupts already-written files
//! - Single-file mode for ad-hoc extraction
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Extract every archive listed in zips.csv, four at a time
//!     batchzip::unzip_dir(
//!         Path::new("./zips"),
//!         Path::new("./zips.csv"),
//!         4,
//!         CancellationToken::new(),
//!     )
//!     .await
//! }
//! ```

pub mod batch;
pub mod cli;
pub mod error;
pub mod extract;
pub mod manifest;

pub use batch::{ExtractionJob, build_jobs, check_jobs, run_batch, unzip_dir};
pub use cli::Cli;
pub use error::MultiError;
pub use extract::{CancelReader, extract_archive, unzip_file};
pub use manifest::{ManifestRow, read_manifest};
