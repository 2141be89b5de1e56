//! Walks a project root and assembles the aggregate document.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use walkdir::WalkDir;

use super::error::CoreError;
use super::report::{self, ExtractionReport, FileContent, FileEntry, SkipReason, SkippedFile};
use super::{relative_path, IgnoreSet, TreeGenerator};
use crate::utils::file_detection::{is_binary, is_code_extension};

/// Size cap applied when the caller does not pick one.
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 500;

/// Policy for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Files strictly larger than this are skipped with a size reason.
    pub max_file_size_bytes: u64,
    /// Include binary files (as a marker) even outside the code allowlist.
    pub include_binary: bool,
    pub ignore: IgnoreSet,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_KB * 1024,
            include_binary: false,
            ignore: IgnoreSet::defaults(),
        }
    }
}

impl ExtractionOptions {
    /// Builds validated options from user-facing values. The ignore set is
    /// the defaults plus the comma-separated `custom_patterns`.
    pub fn new(
        max_file_size_kb: Option<u64>,
        include_binary: bool,
        custom_patterns: &str,
    ) -> Result<Self, CoreError> {
        let kb = max_file_size_kb.unwrap_or(DEFAULT_MAX_FILE_SIZE_KB);
        let options = Self {
            max_file_size_bytes: kb.saturating_mul(1024),
            include_binary,
            ignore: IgnoreSet::with_custom(custom_patterns),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_file_size_bytes == 0 {
            return Err(CoreError::InvalidOption(
                "max file size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// What happened to a single walked file.
enum Outcome {
    Included(FileEntry),
    Skipped(SkippedFile),
    /// Never a candidate; not reported.
    Excluded,
}

/// Extracts the tree and eligible file contents below `root`.
///
/// Only an invalid root or invalid options fail the call. Per-file problems
/// end up in `skipped_entries`.
pub fn collect(root: &Path, options: &ExtractionOptions) -> Result<ExtractionReport, CoreError> {
    options.validate()?;

    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CoreError::RootNotFound(root.to_path_buf()),
        _ => CoreError::Io(e, root.to_path_buf()),
    })?;
    if !metadata.is_dir() {
        return Err(CoreError::NotADirectory(root.to_path_buf()));
    }

    tracing::info!(
        "Extracting {} (max {} bytes, include_binary={}, {} ignore tokens)",
        root.display(),
        options.max_file_size_bytes,
        options.include_binary,
        options.ignore.len()
    );

    let mut doc = String::new();
    report::write_header(&mut doc, root, options.max_file_size_bytes);
    report::write_tree(&mut doc, TreeGenerator::lines(root, &options.ignore));

    let mut file_entries = Vec::new();
    let mut skipped_entries = Vec::new();

    // Ignored directories are pruned here, so their contents are never read.
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !options
                    .ignore
                    .is_ignored(Path::new(&relative_path(root, entry.path())))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable walk entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = relative_path(root, entry.path());
        match examine(entry.path(), relative, options) {
            Outcome::Included(file) => {
                report::write_file_section(&mut doc, &file);
                file_entries.push(file);
            }
            Outcome::Skipped(skipped) => skipped_entries.push(skipped),
            Outcome::Excluded => {}
        }
    }

    report::write_skipped(&mut doc, &skipped_entries);

    tracing::info!(
        "Extraction finished: {} files included, {} skipped",
        file_entries.len(),
        skipped_entries.len()
    );

    Ok(ExtractionReport {
        aggregate_document: doc,
        file_entries,
        skipped_entries,
    })
}

/// Applies size, binary and read policy to one file.
fn examine(path: &Path, relative_path: String, options: &ExtractionOptions) -> Outcome {
    // Follows symlinks; links to directories and dangling links drop out here.
    let metadata = match fs::metadata(path) {
        Ok(md) if md.is_file() => md,
        Ok(_) => return Outcome::Excluded,
        Err(e) => {
            tracing::debug!("Cannot stat {}: {}", relative_path, e);
            return Outcome::Excluded;
        }
    };

    let size = metadata.len();
    if size > options.max_file_size_bytes {
        tracing::debug!("Skipping {}: {} bytes exceeds size cap", relative_path, size);
        return Outcome::Skipped(SkippedFile {
            relative_path,
            reason: SkipReason::Size { bytes: size },
        });
    }

    let binary = is_binary(path);
    if binary && !options.include_binary && !is_code_extension(path) {
        tracing::debug!("Excluding binary file {}", relative_path);
        return Outcome::Excluded;
    }

    let content = if binary {
        FileContent::Binary
    } else {
        match fs::read(path) {
            Ok(bytes) => FileContent::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", relative_path, e);
                return Outcome::Skipped(SkippedFile {
                    relative_path,
                    reason: SkipReason::Error(e.to_string()),
                });
            }
        }
    };

    Outcome::Included(FileEntry {
        relative_path,
        content,
    })
}
