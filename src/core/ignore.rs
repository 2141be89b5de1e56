//! Case-insensitive ignore tokens and the matcher that applies them.

use std::collections::BTreeSet;
use std::path::Path;

/// Tokens every extraction starts from. Never mutated; custom tokens are
/// unioned into a fresh `IgnoreSet` per run.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    "__pycache__",
    ".git",
    ".vscode",
    ".idea",
    "dist",
    "build",
    "target",
    ".gradle",
    "bin",
    "obj",
    ".DS_Store",
    "Thumbs.db",
    "*.pyc",
    "*.pyo",
    "*.class",
    ".env",
    ".env.local",
    ".env.production",
    "venv",
    "env",
    "coverage",
    ".nyc_output",
    "*.log",
    "*.tmp",
    "*.temp",
];

/// An immutable set of lower-cased, trimmed, non-empty ignore tokens.
///
/// A token either matches as a substring of the path / the exact file name,
/// or, in the `*.ext` form, as a suffix of the file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    tokens: BTreeSet<String>,
}

impl IgnoreSet {
    /// A set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in default tokens only.
    pub fn defaults() -> Self {
        Self::from_tokens(DEFAULT_IGNORE_PATTERNS.iter().copied())
    }

    /// Defaults unioned with a comma-separated list of custom tokens.
    pub fn with_custom(custom: &str) -> Self {
        Self::from_tokens(DEFAULT_IGNORE_PATTERNS.iter().copied().chain(custom.split(',')))
    }

    /// Builds a set from arbitrary tokens, dropping blanks.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// Returns a new set containing these tokens plus `extra`.
    pub fn union<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged = self.clone();
        merged.tokens.extend(Self::from_tokens(extra).tokens);
        merged
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks `path` against every token. See [`is_ignored`].
    pub fn is_ignored(&self, path: &Path) -> bool {
        is_ignored(path, self)
    }
}

/// Returns `true` when any token of `ignore_set` excludes `path`.
///
/// Callers pass the path relative to the extraction root.
pub fn is_ignored(path: &Path, ignore_set: &IgnoreSet) -> bool {
    let path_lower = path.to_string_lossy().to_lowercase();
    let name_lower = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    ignore_set
        .tokens()
        .any(|token| token_matches(token, &path_lower, &name_lower))
}

fn token_matches(token: &str, path_lower: &str, name_lower: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if path_lower.contains(token) || name_lower == token {
        return true;
    }
    match token.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => name_lower.ends_with(suffix),
        _ => false,
    }
}
