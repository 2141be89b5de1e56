//! Extraction results and the layout of the aggregate document.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Stands in for the content of binary files in the document.
pub const BINARY_MARKER: &str = "[Binary file - content not displayed]";

/// Skipped files listed in the document before the remainder is summarized.
pub const MAX_LISTED_SKIPS: usize = 20;

const RULE_WIDTH: usize = 80;

/// The captured content of one included file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum FileContent {
    Text(String),
    Binary,
}

impl FileContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Binary => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, FileContent::Binary)
    }
}

impl fmt::Display for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileContent::Text(text) => f.write_str(text),
            FileContent::Binary => f.write_str(BINARY_MARKER),
        }
    }
}

/// A file that made it into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Path relative to the extraction root, always with `/` separators.
    pub relative_path: String,
    pub content: FileContent,
}

/// Why a candidate file was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// Larger than the configured cap.
    Size { bytes: u64 },
    /// Reading the file failed.
    Error(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Size { bytes } => write!(f, "size: {}KB", bytes / 1024),
            SkipReason::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.relative_path, self.reason)
    }
}

/// Everything one extraction produced. The caller owns it outright.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub aggregate_document: String,
    /// Included files in walk order.
    pub file_entries: Vec<FileEntry>,
    /// Every skip, including those beyond the document's listing cap.
    pub skipped_entries: Vec<SkippedFile>,
}

impl ExtractionReport {
    pub fn included_count(&self) -> usize {
        self.file_entries.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_entries.len()
    }

    /// Looks up an included file by its relative path.
    pub fn file(&self, relative_path: &str) -> Option<&FileEntry> {
        self.file_entries
            .iter()
            .find(|entry| entry.relative_path == relative_path)
    }

    pub fn relative_paths(&self) -> impl Iterator<Item = &str> {
        self.file_entries.iter().map(|e| e.relative_path.as_str())
    }
}

// Serialized by hand so the counts travel with the lists.
impl Serialize for ExtractionReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExtractionReport", 5)?;
        state.serialize_field("included_count", &self.included_count())?;
        state.serialize_field("skipped_count", &self.skipped_count())?;
        state.serialize_field("file_entries", &self.file_entries)?;
        state.serialize_field("skipped_entries", &self.skipped_entries)?;
        state.serialize_field("aggregate_document", &self.aggregate_document)?;
        state.end()
    }
}

/// Appends the title block.
pub(crate) fn write_header(doc: &mut String, root: &Path, max_file_size_bytes: u64) {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    doc.push_str(&format!("# Project Code Extract: {name}\n"));
    doc.push_str(&format!("# Source: {}\n", root.display()));
    doc.push_str(&format!("# Max file size: {}KB\n", max_file_size_bytes / 1024));
    doc.push_str(&"=".repeat(RULE_WIDTH));
    doc.push_str("\n\n");
}

/// Appends the fenced folder tree and opens the file contents section.
pub(crate) fn write_tree<I>(doc: &mut String, lines: I)
where
    I: IntoIterator<Item = String>,
{
    doc.push_str("## FOLDER STRUCTURE\n");
    doc.push_str("```\n\n");
    for line in lines {
        doc.push_str(&line);
        doc.push('\n');
    }
    doc.push_str("```\n\n");
    doc.push_str("## FILE CONTENTS\n\n");
}

/// Appends one file section. Content is newline-terminated inside the fence.
pub(crate) fn write_file_section(doc: &mut String, entry: &FileEntry) {
    doc.push_str(&format!("### {}\n", entry.relative_path));
    doc.push_str("```");
    match &entry.content {
        FileContent::Text(text) => doc.push_str(text),
        FileContent::Binary => doc.push_str(BINARY_MARKER),
    }
    if !doc.ends_with('\n') {
        doc.push('\n');
    }
    doc.push_str("```\n\n");
}

/// Appends the skip summary, listing at most [`MAX_LISTED_SKIPS`] entries.
pub(crate) fn write_skipped(doc: &mut String, skipped: &[SkippedFile]) {
    if skipped.is_empty() {
        return;
    }
    doc.push_str("## SKIPPED FILES\n");
    doc.push_str("The following files were skipped:\n");
    for entry in skipped.iter().take(MAX_LISTED_SKIPS) {
        doc.push_str(&format!("- {entry}\n"));
    }
    if skipped.len() > MAX_LISTED_SKIPS {
        doc.push_str(&format!(
            "... and {} more files\n",
            skipped.len() - MAX_LISTED_SKIPS
        ));
    }
    doc.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip(i: usize) -> SkippedFile {
        SkippedFile {
            relative_path: format!("big/{i}.bin"),
            reason: SkipReason::Size { bytes: 2048 + i as u64 },
        }
    }

    #[test]
    fn test_header_layout() {
        let mut doc = String::new();
        write_header(&mut doc, Path::new("/work/demo"), 500 * 1024);
        let expected = format!(
            "# Project Code Extract: demo\n# Source: /work/demo\n# Max file size: 500KB\n{}\n\n",
            "=".repeat(80)
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_file_section_terminates_content() {
        let mut doc = String::new();
        write_file_section(
            &mut doc,
            &FileEntry {
                relative_path: "src/a.rs".into(),
                content: FileContent::Text("fn a() {}".into()),
            },
        );
        write_file_section(
            &mut doc,
            &FileEntry {
                relative_path: "empty.txt".into(),
                content: FileContent::Text(String::new()),
            },
        );
        write_file_section(
            &mut doc,
            &FileEntry {
                relative_path: "logo.rs".into(),
                content: FileContent::Binary,
            },
        );
        assert_eq!(
            doc,
            "### src/a.rs\n```fn a() {}\n```\n\n\
             ### empty.txt\n```\n```\n\n\
             ### logo.rs\n```[Binary file - content not displayed]\n```\n\n"
        );
    }

    #[test]
    fn test_skip_reasons_render() {
        assert_eq!(skip(0).to_string(), "big/0.bin (size: 2KB)");
        let err = SkippedFile {
            relative_path: "x.txt".into(),
            reason: SkipReason::Error("permission denied".into()),
        };
        assert_eq!(err.to_string(), "x.txt (error: permission denied)");
    }

    #[test]
    fn test_skip_list_is_truncated() {
        let skipped: Vec<_> = (0..23).map(skip).collect();
        let mut doc = String::new();
        write_skipped(&mut doc, &skipped);

        assert_eq!(doc.matches("\n- ").count(), MAX_LISTED_SKIPS);
        assert!(doc.contains("- big/19.bin (size: 2KB)\n"));
        assert!(!doc.contains("big/20.bin"));
        assert!(doc.ends_with("... and 3 more files\n\n"));
    }

    #[test]
    fn test_json_carries_counts() {
        let report = ExtractionReport {
            aggregate_document: "doc".into(),
            file_entries: vec![FileEntry {
                relative_path: "a.rs".into(),
                content: FileContent::Binary,
            }],
            skipped_entries: (0..3).map(skip).collect(),
        };

        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["included_count"], 1);
        assert_eq!(value["skipped_count"], 3);
        assert_eq!(value["file_entries"][0]["content"]["kind"], "binary");
        assert_eq!(value["skipped_entries"][2]["reason"]["size"]["bytes"], 2050);
        assert_eq!(value["aggregate_document"], "doc");
    }

    #[test]
    fn test_no_skip_section_without_skips() {
        let mut doc = String::new();
        write_skipped(&mut doc, &[]);
        assert!(doc.is_empty());
    }
}
