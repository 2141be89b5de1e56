//! Retrieval of remote repositories into a local directory.
//!
//! The extraction core only ever sees a plain directory. Anything remote is
//! resolved here first, behind the [`RepositoryFetcher`] trait so tests can
//! substitute a local fixture without touching the network.

use async_trait::async_trait;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::OnceLock;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[source] io::Error),

    #[error("Failed to launch git: {0}")]
    GitLaunch(#[source] io::Error),

    #[error("git clone of {url} exited with {status}")]
    GitFailed { url: String, status: ExitStatus },
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub name: String,
}

fn github_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)github\.com[/:]([^/\s?#]+)/([^/\s?#]+)").expect("valid GitHub URL regex")
    })
}

impl GithubRepo {
    /// Accepts `https://github.com/owner/repo`, with or without `.git`,
    /// trailing path segments, or the `git@github.com:owner/repo` form.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let captures = github_url_regex()
            .captures(url.trim())
            .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        let owner = captures[1].to_string();
        let name = captures[2].trim_end_matches(".git").to_string();
        if name.is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        Ok(Self { owner, name })
    }

    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.name)
    }
}

/// A repository materialized on local disk. Temporary storage, if any, is
/// removed when this value is dropped.
#[derive(Debug)]
pub struct FetchedRepository {
    root: PathBuf,
    _workspace: Option<TempDir>,
}

impl FetchedRepository {
    /// A checkout living inside `workspace`, deleted with it.
    pub fn in_workspace(root: PathBuf, workspace: TempDir) -> Self {
        Self {
            root,
            _workspace: Some(workspace),
        }
    }

    /// An existing directory that must not be cleaned up.
    pub fn existing(root: PathBuf) -> Self {
        Self {
            root,
            _workspace: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolves a remote URL to a local directory.
///
/// Dropping the returned future before it completes must release whatever
/// the fetch had acquired so far (child processes, temporary storage).
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    async fn fetch_to_local_directory(&self, url: &str)
        -> Result<FetchedRepository, FetchError>;
}

/// Fetches GitHub repositories with a shallow `git clone`.
#[derive(Debug, Clone)]
pub struct GitCloneFetcher {
    git_binary: String,
}

impl Default for GitCloneFetcher {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
        }
    }
}

impl GitCloneFetcher {
    pub fn with_git_binary(git_binary: impl Into<String>) -> Self {
        Self {
            git_binary: git_binary.into(),
        }
    }
}

#[async_trait]
impl RepositoryFetcher for GitCloneFetcher {
    async fn fetch_to_local_directory(
        &self,
        url: &str,
    ) -> Result<FetchedRepository, FetchError> {
        let repo = GithubRepo::parse(url)?;
        let workspace = tempfile::Builder::new()
            .prefix("codeharvest-")
            .tempdir()
            .map_err(FetchError::TempDir)?;
        let root = workspace.path().join(&repo.name);
        let clone_url = repo.clone_url();

        tracing::info!(
            repo_url = %clone_url,
            path = %root.display(),
            "Cloning repository"
        );

        // Declared after `workspace`, so on cancellation git is killed
        // before the checkout directory is removed.
        let mut child = Command::new(&self.git_binary)
            .args(["clone", "--depth", "1", "--quiet"])
            .arg(&clone_url)
            .arg(&root)
            .kill_on_drop(true)
            .spawn()
            .map_err(FetchError::GitLaunch)?;
        let status = child.wait().await.map_err(FetchError::GitLaunch)?;

        if !status.success() {
            tracing::error!(repo_url = %clone_url, "Git exited with non-zero code: {}", status);
            return Err(FetchError::GitFailed {
                url: clone_url,
                status,
            });
        }

        Ok(FetchedRepository::in_workspace(root, workspace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_github_urls() {
        let expected = GithubRepo {
            owner: "rust-lang".into(),
            name: "cargo".into(),
        };
        for url in [
            "https://github.com/rust-lang/cargo",
            "https://github.com/rust-lang/cargo/",
            "https://github.com/rust-lang/cargo.git",
            "http://www.GitHub.com/rust-lang/cargo/tree/master/src",
            "git@github.com:rust-lang/cargo.git",
            "  github.com/rust-lang/cargo  ",
        ] {
            assert_eq!(GithubRepo::parse(url).unwrap(), expected, "{url}");
        }
    }

    #[test]
    fn test_reject_non_github_urls() {
        for url in [
            "https://gitlab.com/a/b",
            "https://github.com/only-owner",
            "",
        ] {
            assert!(matches!(
                GithubRepo::parse(url),
                Err(FetchError::InvalidUrl(_))
            ));
        }
    }

    #[test]
    fn test_clone_url() {
        let repo = GithubRepo::parse("https://github.com/a/b.git").unwrap();
        assert_eq!(repo.clone_url(), "https://github.com/a/b.git");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_spawning_git() {
        let fetcher = GitCloneFetcher::with_git_binary("/nonexistent/git");
        let err = fetcher
            .fetch_to_local_directory("not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_missing_git_binary_is_a_launch_error() {
        let fetcher = GitCloneFetcher::with_git_binary("/nonexistent/git");
        let err = fetcher
            .fetch_to_local_directory("https://github.com/a/b")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::GitLaunch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_clone_kills_git_and_removes_checkout() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        // Stands in for git: creates the destination, records it, then hangs.
        let scripts = TempDir::new().unwrap();
        let marker = scripts.path().join("dest");
        let git = scripts.path().join("git");
        fs::write(
            &git,
            format!(
                "#!/bin/sh\nfor arg; do dest=\"$arg\"; done\nmkdir -p \"$dest\"\n\
                 echo \"$dest\" > '{}'\nexec sleep 30\n",
                marker.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&git, fs::Permissions::from_mode(0o755)).unwrap();

        let fetcher = GitCloneFetcher::with_git_binary(git.to_string_lossy());
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            fetcher.fetch_to_local_directory("https://github.com/a/b"),
        )
        .await;
        assert!(result.is_err());

        let dest = PathBuf::from(fs::read_to_string(&marker).unwrap().trim());
        assert!(dest.ends_with("b"));
        assert!(!dest.parent().unwrap().exists());
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let workspace = TempDir::new().unwrap();
        let workspace_path = workspace.path().to_path_buf();
        let fetched = FetchedRepository::in_workspace(workspace_path.join("repo"), workspace);
        assert!(workspace_path.exists());
        drop(fetched);
        assert!(!workspace_path.exists());
    }
}
