//! Generates an ASCII representation of a directory tree.

use std::fs;
use std::path::{Path, PathBuf};

use super::{relative_path, IgnoreSet};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// A utility struct for generating an ASCII directory tree.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders the tree below `root` into owned lines (without trailing newlines).
    pub fn render(root: &Path, ignore_set: &IgnoreSet) -> Vec<String> {
        Self::lines(root, ignore_set).collect()
    }

    /// Lazily yields the tree lines below `root`, depth-first and pre-order.
    ///
    /// Children are filtered through `ignore_set` and sorted by name. A
    /// directory that cannot be listed renders as an empty subtree.
    pub fn lines<'a>(root: &'a Path, ignore_set: &'a IgnoreSet) -> TreeLines<'a> {
        let children = list_children(root, root, ignore_set);
        TreeLines {
            root,
            ignore_set,
            stack: vec![Level {
                children,
                next: 0,
                prefix: String::new(),
            }],
        }
    }
}

/// Iterator over rendered tree lines. Uses an explicit stack, so depth is
/// bounded by memory rather than the call stack.
pub struct TreeLines<'a> {
    root: &'a Path,
    ignore_set: &'a IgnoreSet,
    stack: Vec<Level>,
}

/// One directory being rendered.
struct Level {
    children: Vec<Child>,
    next: usize,
    prefix: String,
}

#[derive(Debug)]
struct Child {
    name: String,
    path: PathBuf,
    is_directory: bool,
}

impl Iterator for TreeLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let level = self.stack.last_mut()?;
            if level.next >= level.children.len() {
                self.stack.pop();
                continue;
            }

            let index = level.next;
            level.next += 1;
            let is_last = index + 1 == level.children.len();
            let child = &level.children[index];

            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            let line = format!("{}{connector}{}", level.prefix, child.name);

            if child.is_directory {
                let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                let prefix = format!("{}{indent}", level.prefix);
                let dir = child.path.clone();
                let children = list_children(self.root, &dir, self.ignore_set);
                self.stack.push(Level {
                    children,
                    next: 0,
                    prefix,
                });
            }

            return Some(line);
        }
    }
}

/// Lists, filters and sorts the immediate children of `dir`.
fn list_children(root: &Path, dir: &Path, ignore_set: &IgnoreSet) -> Vec<Child> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            // Unreadable directories render as empty, without a skip record.
            tracing::debug!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut children: Vec<Child> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            let relative = relative_path(root, &path);
            if ignore_set.is_ignored(Path::new(&relative)) {
                return None;
            }
            let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            Some(Child {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_directory,
            })
        })
        .collect();

    children.sort_by(|a, b| a.name.cmp(&b.name));
    children
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_tree(paths: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for path in paths {
            let full = dir.path().join(path);
            if path.ends_with('/') {
                fs::create_dir_all(&full).unwrap();
            } else {
                fs::create_dir_all(full.parent().unwrap()).unwrap();
                fs::write(&full, "x").unwrap();
            }
        }
        dir
    }

    #[test]
    fn test_render_nested_tree() {
        let dir = create_tree(&["src/main.rs", "src/lib.rs", "README.md", "tests/it.rs", "docs/"]);

        let tree = TreeGenerator::render(dir.path(), &IgnoreSet::empty()).join("\n");
        insta::assert_snapshot!(tree, @r"
        ├── README.md
        ├── docs
        ├── src
        │   ├── lib.rs
        │   └── main.rs
        └── tests
            └── it.rs
        ");
    }

    #[test]
    fn test_sort_is_case_sensitive_codepoint_order() {
        let dir = create_tree(&["b.txt", "B.txt", "a.txt", "_x.txt"]);
        let lines = TreeGenerator::render(dir.path(), &IgnoreSet::empty());
        assert_eq!(lines, vec!["├── B.txt", "├── _x.txt", "├── a.txt", "└── b.txt"]);
    }

    #[test]
    fn test_ignored_children_are_hidden_with_their_subtrees() {
        let dir = create_tree(&["node_modules/pkg/index.js", "src/app.js", "debug.LOG"]);
        let lines = TreeGenerator::render(dir.path(), &IgnoreSet::defaults());
        assert_eq!(lines, vec!["└── src", "    └── app.js"]);
    }

    #[test]
    fn test_last_connector_is_decided_after_filtering() {
        let dir = create_tree(&["a.txt", "z.tmp"]);
        let lines = TreeGenerator::render(dir.path(), &IgnoreSet::from_tokens(["*.tmp"]));
        assert_eq!(lines, vec!["└── a.txt"]);
    }

    #[test]
    fn test_missing_root_renders_nothing() {
        let dir = TempDir::new().unwrap();
        let lines = TreeGenerator::render(&dir.path().join("absent"), &IgnoreSet::empty());
        assert!(lines.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_renders_empty_subtree() {
        use crate::utils::test_helpers::running_as_root;
        use std::os::unix::fs::PermissionsExt;

        if running_as_root() {
            return;
        }

        let dir = create_tree(&["locked/secret.txt", "open/file.txt"]);
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let lines = TreeGenerator::render(dir.path(), &IgnoreSet::empty());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(lines, vec!["├── locked", "└── open", "    └── file.txt"]);
    }
}
