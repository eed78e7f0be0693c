//! Finding CSV files on disk and capturing a bounded sample of each.
//!
//! Discovery walks a directory (optionally recursively) in file-name order,
//! keeps files whose name matches a glob pattern, sniffs each file's
//! delimiter from its first few kilobytes, and reads the header row plus a
//! small number of data rows into a [`FileSchema`].

use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::{
    config::GrouperConfig,
    error::{GrouperError, Result},
    io_utils,
    schema::{DEFAULT_DELIMITER, FileSchema},
};

pub const SNIFF_SAMPLE_BYTES: usize = 4096;
pub const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];
const SNIFF_MAX_LINES: usize = 20;

/// Lists regular files under `root` whose file name matches `pattern`.
pub fn discover_files(root: &Path, recursive: bool, pattern: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(GrouperError::NotADirectory(root.to_path_buf()));
    }
    let matcher = Pattern::new(pattern).map_err(|source| GrouperError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {root:?}: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| matcher.matches(name));
        if matches {
            paths.push(entry.into_path());
        }
    }
    debug!("Matched {} file(s) under {root:?} with '{pattern}'", paths.len());
    Ok(paths)
}

/// Best-guess delimiter for a sample of raw bytes.
///
/// A candidate scores by how many sampled lines share the first line's
/// (non-zero) count of that character outside quotes, then by the count
/// itself. Ties go to the earlier candidate; no candidate means comma.
pub fn sniff_delimiter(sample: &[u8]) -> char {
    let text = String::from_utf8_lossy(sample);
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_MAX_LINES + 1)
        .collect();
    // The final line of a truncated sample is usually cut short.
    if lines.len() > 1 && (sample.len() >= SNIFF_SAMPLE_BYTES || lines.len() > SNIFF_MAX_LINES) {
        lines.pop();
    }
    let Some(first) = lines.first() else {
        return DEFAULT_DELIMITER;
    };

    let mut best: Option<(char, (usize, usize))> = None;
    for candidate in CANDIDATE_DELIMITERS {
        let expected = count_unquoted(first, candidate);
        if expected == 0 {
            continue;
        }
        let consistent = lines
            .iter()
            .filter(|line| count_unquoted(line, candidate) == expected)
            .count();
        let score = (consistent, expected);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.map_or(DEFAULT_DELIMITER, |(delimiter, _)| delimiter)
}

fn count_unquoted(line: &str, delimiter: char) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Reads the header row and up to `config.sample_rows` data rows of `path`.
///
/// Fails with [`GrouperError::EmptyFile`] when the file has no header row.
pub fn read_file_schema(path: &Path, config: &GrouperConfig) -> Result<FileSchema> {
    let prefix = io_utils::read_prefix(path, SNIFF_SAMPLE_BYTES)?;
    // The csv reader skips blank lines; a blank first line means no header row.
    if prefix.is_empty() || prefix.starts_with(b"\n") || prefix.starts_with(b"\r") {
        return Err(GrouperError::EmptyFile(path.to_path_buf()));
    }
    let delimiter = config
        .delimiter
        .unwrap_or_else(|| sniff_delimiter(&prefix));
    let mut reader = io_utils::open_csv_file(path, delimiter)?;
    let mut records = reader.byte_records();

    let headers = match records.next() {
        Some(record) => io_utils::decode_record(&record?, config.encoding)?,
        None => Vec::new(),
    };
    if headers.is_empty() {
        return Err(GrouperError::EmptyFile(path.to_path_buf()));
    }

    let mut sample_rows = Vec::with_capacity(config.sample_rows);
    for record in records.take(config.sample_rows) {
        sample_rows.push(io_utils::decode_record(&record?, config.encoding)?);
    }

    debug!(
        "Read {} header(s) and {} sample row(s) from {path:?} (delimiter '{}')",
        headers.len(),
        sample_rows.len(),
        crate::printable_delimiter(delimiter)
    );
    Ok(FileSchema::from_samples(
        path.to_string_lossy(),
        headers,
        sample_rows,
        delimiter,
    ))
}
