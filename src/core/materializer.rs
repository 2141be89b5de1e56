//! Creates folders and placeholder files from a parsed structure.

use serde::Serialize;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use super::structure_parser::{PathKind, StructurePath};

/// What was created, in creation order. Paths are absolute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializationResult {
    pub created_files: Vec<PathBuf>,
    pub created_folders: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl MaterializationResult {
    pub fn is_empty(&self) -> bool {
        self.created_files.is_empty() && self.created_folders.is_empty()
    }
}

/// Creates every entry of `paths` below `base_path`.
///
/// A failing entry is recorded and the rest are still attempted. Only a
/// failure to create `base_path` itself stops the run early.
pub fn materialize(base_path: &Path, paths: &[StructurePath]) -> MaterializationResult {
    let mut result = MaterializationResult::default();

    let base = match prepare_base(base_path) {
        Ok(base) => base,
        Err(e) => {
            tracing::error!("Cannot prepare {}: {}", base_path.display(), e);
            result.errors.push(format!("General error: {e}"));
            return result;
        }
    };

    for entry in paths {
        if let Err(e) = create_entry(&base, entry, &mut result) {
            tracing::warn!("Failed to create {}: {}", entry.path, e);
            result
                .errors
                .push(format!("Error creating {}: {}", entry.path, e));
        }
    }

    tracing::info!(
        "Materialized {} folders and {} files under {} ({} errors)",
        result.created_folders.len(),
        result.created_files.len(),
        base.display(),
        result.errors.len()
    );
    result
}

/// The text written into every generated file.
pub fn placeholder_content(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    format!("# {name}\n# TODO: Add content\n")
}

fn prepare_base(base_path: &Path) -> io::Result<PathBuf> {
    let base = if base_path.is_absolute() {
        base_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(base_path)
    };
    fs::create_dir_all(&base)?;
    Ok(base)
}

fn create_entry(
    base: &Path,
    entry: &StructurePath,
    result: &mut MaterializationResult,
) -> io::Result<()> {
    let full_path = base.join(contained_relative(&entry.path)?);

    match entry.kind {
        PathKind::File => {
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, placeholder_content(&entry.path))?;
            push_once(&mut result.created_files, full_path);
        }
        PathKind::Directory => {
            fs::create_dir_all(&full_path)?;
            push_once(&mut result.created_folders, full_path);
        }
    }
    Ok(())
}

/// Rejects paths that would land outside the base directory.
fn contained_relative(path: &str) -> io::Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    "path escapes the base directory",
                ));
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(io::Error::new(ErrorKind::InvalidInput, "empty path"));
    }
    Ok(relative)
}

fn push_once(list: &mut Vec<PathBuf>, path: PathBuf) {
    if !list.contains(&path) {
        list.push(path);
    }
}
