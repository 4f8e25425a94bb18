//! CSV manifest reading and validation.
//!
//! The manifest is a comma-delimited UTF-8 file with a header row, mapping
//! zip filenames to the passwords needed to open them:
//!
//! ```csv
//! File Name,Zip Password
//! reports.zip,hunter2
//! photos.zip,
//! ```
//!
//! An empty password marks an archive that needs none.
//!
//! ## Validation
//!
//! Validation runs before any filesystem work and applies these rules in
//! order, each with its own failure:
//!
//! 1. The file must parse; a row whose column count differs from the
//!    header's is a fatal parse error, not recovered per record
//! 2. At least one data row must follow the header
//! 3. The header must have at least two columns
//! 4. The filename column is the one named `File Name`, else column 0
//! 5. The password column is the one named `Zip Password`, else the last
//! 6. No data row may have an empty filename
//! 7. No two data rows may share a filename
//!
//! Rules 6 and 7 scan the whole manifest before failing, so a single run
//! reports every offending line number at once. Line numbers are 1-based
//! with the header on line 1.

use std::path::Path;

use anyhow::{Result, anyhow, bail};

use crate::error::MultiError;

/// Header name selecting the filename column.
pub const FILENAME_COL_NAME: &str = "File Name";
/// Header name selecting the password column.
pub const PASSWORD_COL_NAME: &str = "Zip Password";

/// One validated manifest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    /// Zip filename, relative to the batch directory. Non-empty and unique
    /// across the manifest.
    pub filename: String,
    /// Password for the archive; empty when none is needed.
    pub password: String,
}

/// Read and validate a manifest file.
///
/// Returns the data rows in file order, or the first failing validation
/// rule's error with every violation of that rule aggregated into it.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRow>> {
    let records = read_csv_file(path)?;
    validate_records(&records)?;

    let header = &records[0];
    let filename_col = find_filename_col(header);
    let password_col = find_password_col(header);

    let rows = records[1..]
        .iter()
        .map(|cols| ManifestRow {
            filename: cols[filename_col].clone(),
            password: cols[password_col].clone(),
        })
        .collect();
    Ok(rows)
}

/// Read every record of the csv file, header included.
///
/// The reader is strict: any record whose field count differs from the
/// header's fails the whole read immediately.
fn read_csv_file(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| match err.kind() {
            csv::ErrorKind::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                anyhow!("csv file doesn't exist: '{}'", path.display())
            }
            _ => anyhow!("failed to open csv file '{}': {err}", path.display()),
        })?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| anyhow!("failed to parse csv file: {err}"))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

fn validate_records(records: &[Vec<String>]) -> Result<()> {
    validate_record_count(records)?;
    validate_header_col_count(records)?;
    check_empty_filenames(records)?;
    check_duplicate_filenames(records)?;
    Ok(())
}

fn validate_record_count(records: &[Vec<String>]) -> Result<()> {
    if records.len() < 2 {
        bail!("csv file doesn't have any data rows");
    }
    Ok(())
}

fn validate_header_col_count(records: &[Vec<String>]) -> Result<()> {
    let header_col_count = records[0].len();
    if header_col_count < 2 {
        bail!(
            "unexpected header column count in csv file. count: {header_col_count} expected count: 2 or more"
        );
    }
    Ok(())
}

/// Rule 6: every data row needs a filename. Scans the whole manifest and
/// reports every offending line in one error.
fn check_empty_filenames(records: &[Vec<String>]) -> Result<()> {
    let filename_col = find_filename_col(&records[0]);
    let line_nums: Vec<usize> = records
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, cols)| cols[filename_col].is_empty())
        .map(|(i, _)| i + 1)
        .collect();
    if !line_nums.is_empty() {
        bail!(
            "empty filenames found in csv file on lines: {}",
            join_line_nums(&line_nums)
        );
    }
    Ok(())
}

/// Rule 7: filenames are unique. Every line of every duplicate group is
/// reported, first occurrence included.
fn check_duplicate_filenames(records: &[Vec<String>]) -> Result<()> {
    let filename_col = find_filename_col(&records[0]);

    // Group line numbers by filename, preserving first-seen order so the
    // report follows the manifest.
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (i, cols) in records.iter().enumerate().skip(1) {
        let filename = cols[filename_col].as_str();
        match groups.iter_mut().find(|(name, _)| *name == filename) {
            Some((_, line_nums)) => line_nums.push(i + 1),
            None => groups.push((filename, vec![i + 1])),
        }
    }

    let errs: Vec<anyhow::Error> = groups
        .iter()
        .filter(|(_, line_nums)| line_nums.len() > 1)
        .map(|(name, line_nums)| {
            anyhow!(
                "duplicate filename '{name}' found on lines {}",
                join_line_nums(line_nums)
            )
        })
        .collect();
    if !errs.is_empty() {
        return Err(MultiError::bulleted("duplicate filenames found in csv file", errs).into());
    }
    Ok(())
}

fn find_filename_col(header: &[String]) -> usize {
    header
        .iter()
        .position(|col| col == FILENAME_COL_NAME)
        .unwrap_or(0)
}

fn find_password_col(header: &[String]) -> usize {
    header
        .iter()
        .position(|col| col == PASSWORD_COL_NAME)
        .unwrap_or(header.len() - 1)
}

fn join_line_nums(line_nums: &[usize]) -> String {
    let nums: Vec<String> = line_nums.iter().map(ToString::to_string).collect();
    nums.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("manifest.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_valid_manifest_in_row_order() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "File Name,Zip Password\nfile_1.zip,password_1\nfile_2.zip,\n",
        );
        let rows = read_manifest(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                ManifestRow {
                    filename: "file_1.zip".to_string(),
                    password: "password_1".to_string(),
                },
                ManifestRow {
                    filename: "file_2.zip".to_string(),
                    password: String::new(),
                },
            ]
        );
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_manifest(Path::new("non-existing_manifest.csv")).unwrap_err();
        assert!(err.to_string().contains("doesn't exist"));
    }

    #[test]
    fn ragged_row_is_a_fatal_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "File Name,Zip Password\nfile_1.zip\n");
        let err = read_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse csv file"));
    }

    #[test]
    fn header_only_manifest_has_no_data() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "File Name,Zip Password\n");
        let err = read_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("doesn't have any data rows"));
    }

    #[test]
    fn single_column_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "File Name\nfile_1.zip\n");
        let err = read_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("unexpected header column count"));
    }

    #[test]
    fn empty_filenames_report_every_line() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "File Name,Zip Password\n,password_1\nfile_2.zip,password_2\n,password_3\n",
        );
        let err = read_manifest(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("empty filenames"));
        assert!(msg.contains("2, 4"));
    }

    #[test]
    fn duplicate_filenames_report_every_involved_line() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "File Name,Zip Password\nfile_1.zip,password_1\nfile_2.zip,password_2\nfile_1.zip,password_3\n",
        );
        let err = read_manifest(&path).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("duplicate filenames found in csv file"));
        assert!(msg.contains("file_1.zip"));
        assert!(msg.contains("2, 4"));
    }

    #[test]
    fn filename_column_found_by_header_name() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(
            &dir,
            "column 1,File Name,Zip Password\nx,file_1.zip,password_1\n",
        );
        let rows = read_manifest(&path).unwrap();
        assert_eq!(rows[0].filename, "file_1.zip");
        assert_eq!(rows[0].password, "password_1");
    }

    #[test]
    fn columns_fall_back_to_first_and_last() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, "column 1,column 2\nfile_1.zip,password_1\n");
        let rows = read_manifest(&path).unwrap();
        assert_eq!(rows[0].filename, "file_1.zip");
        assert_eq!(rows[0].password, "password_1");
    }

    #[test]
    fn joins_line_nums_with_commas() {
        assert_eq!(join_line_nums(&[1, 2]), "1, 2");
    }
}
