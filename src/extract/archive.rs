//! Single-archive extraction.
//!
//! One call to [`extract_archive`] handles one archive end to end:
//!
//! 1. **Opening**: the destination directory (archive path with its final
//!    extension stripped) is created and the archive opened. Either failure
//!    fails this archive only, never its siblings.
//! 2. **Security check**: every entry name is scanned before anything is
//!    written. A single name that could resolve outside the destination
//!    directory rejects the whole archive with zero files written.
//! 3. **Per-entry loop**: entries are extracted in archive order. The
//!    cancellation token is checked between entries, and each entry's byte
//!    stream is wrapped so an in-flight copy stops at its next read once
//!    cancellation is requested. One bad entry is recorded and the loop
//!    moves on; it never aborts the rest of the archive.
//! 4. **Outcome**: success only if no entry-level error was recorded,
//!    otherwise all of them combined into one per-archive error.
//!
//! Entries already written before a failure or cancellation stay on disk;
//! there is no rollback. Re-extracting the same archive overwrites in place.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tokio_util::sync::CancellationToken;
use zip::ZipArchive;

use super::cancel::CancelReader;
use crate::error::MultiError;

/// Buffer size for entry copies.
const COPY_BUF_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Permissions for directories the archive doesn't record a mode for,
/// including the destination directory itself.
const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extract one archive into a directory derived from its own path.
///
/// `password` is supplied to encrypted entries only when non-empty; with an
/// empty password such entries fail to open and are reported like any other
/// entry error.
pub fn extract_archive(path: &Path, password: &str, cancel: &CancellationToken) -> Result<()> {
    let dest_dir = dest_dir_path(path);
    create_dir_with_mode(&dest_dir, DEFAULT_DIR_MODE)
        .with_context(|| format!("failed to create dir '{}'", dest_dir.display()))?;

    let file =
        File::open(path).with_context(|| format!("failed to open file '{}'", path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("failed to read zip file '{}'", path.display()))?;

    // Scan every name before the first write so a malicious archive cannot
    // partially extract before being rejected.
    if let Some(name) = find_insecure_name(&archive) {
        bail!("insecure path '{name}' found in zip file '{}'", path.display());
    }

    println!("unzipping {}...", path.display());

    let mut errs: Vec<anyhow::Error> = Vec::new();
    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            errs.push(anyhow!("canceled before all entries were extracted"));
            break;
        }
        if let Err(err) = extract_entry(&mut archive, index, &dest_dir, password, cancel) {
            errs.push(err);
        }
    }

    if !errs.is_empty() {
        let summary = format!("failed to unzip file '{}'", path.display());
        return Err(MultiError::bulleted(summary, errs).into());
    }
    Ok(())
}

fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    dest_dir: &Path,
    password: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    // Metadata comes from the raw entry so directories and undecryptable
    // files can be classified without touching their data.
    let (name, is_dir, mode) = {
        let entry = archive
            .by_index_raw(index)
            .with_context(|| format!("failed to read zip entry {index}"))?;
        (entry.name().to_string(), entry.is_dir(), entry.unix_mode())
    };
    let dst_path = dest_dir.join(&name);

    if is_dir {
        return create_dir_with_mode(&dst_path, mode.unwrap_or(DEFAULT_DIR_MODE))
            .with_context(|| format!("failed to create dir '{}'", dst_path.display()));
    }

    if let Some(parent) = dst_path.parent() {
        create_dir_with_mode(parent, DEFAULT_DIR_MODE)
            .with_context(|| format!("failed to create dir '{}'", parent.display()))?;
    }

    let entry = if password.is_empty() {
        archive.by_index(index)
    } else {
        archive.by_index_decrypt(index, password.as_bytes())
    };
    let entry = entry.with_context(|| format!("failed to open zip entry '{name}'"))?;

    let mut src = BufReader::with_capacity(COPY_BUF_SIZE, CancelReader::new(cancel.clone(), entry));
    let dst_file = create_file_with_mode(&dst_path, mode.unwrap_or(DEFAULT_FILE_MODE))
        .with_context(|| format!("failed to create dst file '{}'", dst_path.display()))?;
    let mut dst = BufWriter::with_capacity(COPY_BUF_SIZE, dst_file);

    io::copy(&mut src, &mut dst)
        .and_then(|_| dst.flush())
        .with_context(|| {
            format!(
                "failed to copy zip entry '{name}' to dst file '{}'",
                dst_path.display()
            )
        })?;
    Ok(())
}

/// Destination directory for an archive: its own path with the final
/// extension stripped. Deterministic, so re-runs land in the same place
/// and differently-named archives never collide.
fn dest_dir_path(archive_path: &Path) -> PathBuf {
    archive_path.with_extension("")
}

fn find_insecure_name<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<String> {
    archive
        .file_names()
        .find(|name| is_insecure_name(name))
        .map(str::to_string)
}

/// An entry name is insecure when it could resolve outside the destination
/// directory: absolute paths, backslash separators, and any traversal that
/// climbs above the destination root at any point.
fn is_insecure_name(name: &str) -> bool {
    if name.is_empty() || name.contains('\\') {
        return true;
    }
    let mut depth: i64 = 0;
    for component in Path::new(name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return true;
                }
            }
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
        }
    }
    false
}

#[cfg(unix)]
fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode & 0o777)
        .create(path)
}

#[cfg(not(unix))]
fn create_dir_with_mode(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn create_file_with_mode(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode & 0o777)
        .open(path)
}

#[cfg(not(unix))]
fn create_file_with_mode(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
