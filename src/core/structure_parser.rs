//! Pulls a list of relative project paths out of free-form text.

use serde::Serialize;

/// Line that introduces the path block, matched case-insensitively.
pub const STRUCTURE_MARKER: &str = "PROJECT_STRUCTURE:";

/// Characters stripped from both ends of a candidate line.
const TRIM_CHARS: &[char] = &['"', '\'', '`', '-', '*', ' ', '\t'];

/// Instructions to paste into an AI assistant so its answer can be parsed.
pub const PROMPT_TEMPLATE: &str = "\
Please create a project structure using this simple format:

PROJECT_STRUCTURE:
project_name
project_name/folder1
project_name/folder1/file1.py
project_name/folder1/file2.js
project_name/folder2
project_name/folder2/subfolder1
project_name/folder2/subfolder1/file3.html
project_name/README.md
project_name/package.json

followed by file content in same order

RULES:
- List each folder and file on a separate line
- Use forward slashes (/) to separate paths
- Folders can be empty (no files inside)
- Files must have extensions
- Start all paths with the project name

Add this to your AI prompt: \"Create a project structure for: [YOUR REQUEST HERE]\"
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    File,
    Directory,
}

impl PathKind {
    /// A path is a file when its last segment has a `.` and it does not end
    /// with a separator. Nothing on disk is consulted.
    pub fn of(path: &str) -> Self {
        if path.ends_with('/') || path.ends_with('\\') {
            return PathKind::Directory;
        }
        let last_segment = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
        if last_segment.contains('.') {
            PathKind::File
        } else {
            PathKind::Directory
        }
    }
}

/// One parsed relative path, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructurePath {
    pub path: String,
    pub kind: PathKind,
}

impl StructurePath {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let kind = PathKind::of(&path);
        Self { path, kind }
    }

    pub fn is_file(&self) -> bool {
        self.kind == PathKind::File
    }
}

/// Extracts paths from `text`.
///
/// With a `PROJECT_STRUCTURE:` line, only the lines after it up to the first
/// blank line are considered. Without one, every non-blank line containing a
/// `/` is a candidate. Duplicates are kept.
pub fn parse(text: &str) -> Vec<StructurePath> {
    let lines: Vec<&str> = text.lines().collect();
    let marker = lines
        .iter()
        .position(|line| line.to_uppercase().contains(STRUCTURE_MARKER));

    match marker {
        Some(index) => lines[index + 1..]
            .iter()
            .map(|line| line.trim())
            .take_while(|line| !line.is_empty())
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| clean_candidate(line, true))
            .collect(),
        None => lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && line.contains('/'))
            .filter_map(|line| clean_candidate(line, false))
            .collect(),
    }
}

/// Strips decoration and decides whether what is left looks like a path.
///
/// Inside a marker block a bare name such as the project root folder is
/// accepted when it is made only of ASCII letters, digits, `_` and `-`.
/// Labels like `Files:` are not.
fn clean_candidate(line: &str, in_marker_block: bool) -> Option<StructurePath> {
    let path = line.trim_matches(TRIM_CHARS);
    if path.is_empty() {
        return None;
    }
    let looks_like_path = path.contains('/') || path.contains('.');
    let bare_name = in_marker_block && is_bare_name(path);
    if looks_like_path || bare_name {
        Some(StructurePath::new(path))
    } else {
        tracing::debug!("Ignoring non-path line: {}", line);
        None
    }
}

fn is_bare_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
