pub mod collector;
pub mod error;
pub mod ignore;
pub mod materializer;
pub mod report;
pub mod structure_parser;
pub mod tree_generator;

use std::path::Path;

pub use collector::{collect, ExtractionOptions, DEFAULT_MAX_FILE_SIZE_KB};
pub use error::CoreError;
pub use ignore::{is_ignored, IgnoreSet, DEFAULT_IGNORE_PATTERNS};
pub use materializer::{materialize, MaterializationResult};
pub use report::{ExtractionReport, FileContent, FileEntry, SkipReason, SkippedFile};
pub use structure_parser::{parse, PathKind, StructurePath, PROMPT_TEMPLATE};
pub use tree_generator::TreeGenerator;

/// Renders the ASCII tree below `root`. See [`TreeGenerator::lines`].
pub fn render(root: &Path, ignore_set: &IgnoreSet) -> Vec<String> {
    TreeGenerator::render(root, ignore_set)
}

/// Returns `path` relative to `root`, joined with `/` on every platform.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/project");
        assert_eq!(relative_path(root, &root.join("src").join("main.rs")), "src/main.rs");
        assert_eq!(relative_path(root, root), "");
    }
}
