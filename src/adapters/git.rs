// ABOUTME: SourceFetcher backed by the git command line.
// ABOUTME: Shallow-clones the selected revision into a run-owned directory and resolves HEAD.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::client::{FetchError, SourceFetcher, SourceTree};
use crate::config::{GitConfig, SourceLocation};
use crate::process::{CommandError, CommandSpec};
use crate::types::CommitId;

/// Clones repositories with `git clone --depth 1`.
#[derive(Debug, Clone)]
pub struct GitFetcher {
    config: GitConfig,
    work_dir: PathBuf,
}

impl GitFetcher {
    pub fn new(config: GitConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            work_dir: work_dir.into(),
        }
    }

    /// A fresh directory under the work dir, removed again when dropped.
    fn checkout_dir(&self, source: &SourceLocation) -> Result<TempDir, FetchError> {
        tempfile::Builder::new()
            .prefix(&format!("{}-", repo_stem(source.url())))
            .tempdir_in(&self.work_dir)
            .map_err(|e| {
                FetchError::io(format!(
                    "cannot create checkout directory in {}: {}",
                    self.work_dir.display(),
                    e
                ))
            })
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::new(&self.config.binary).timeout(self.config.timeout)
    }

    async fn resolve_head(&self, root: &Path) -> Result<CommitId, FetchError> {
        let output = self
            .git()
            .args(["rev-parse", "HEAD"])
            .current_dir(root)
            .run()
            .await
            .map_err(map_fetch_error)?;
        Ok(CommitId::new(output.stdout.trim()))
    }
}

#[async_trait]
impl SourceFetcher for GitFetcher {
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| {
                FetchError::io(format!(
                    "cannot create work directory {}: {}",
                    self.work_dir.display(),
                    e
                ))
            })?;

        // Dropped on every early return, taking a partial clone with it.
        let checkout = self.checkout_dir(source)?;
        let root = checkout.path();
        let mut clone = self.git().args(["clone", "--depth", "1"]);
        if let Some(revision) = source.revision() {
            clone = clone.args(["--branch", revision]);
        }
        clone
            .arg(source.url())
            .arg(root.to_string_lossy())
            .run()
            .await
            .map_err(map_fetch_error)?;

        let commit = self.resolve_head(root).await?;
        tracing::debug!(root = %root.display(), commit = %commit.short(), "source checked out");

        Ok(SourceTree::owned(checkout).with_commit(commit))
    }
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_fetch_error(err: CommandError) -> FetchError {
    let mapped = match err {
        CommandError::Exited { ref stderr, .. } => classify_git_stderr(stderr),
        CommandError::TimedOut { .. } => FetchError::unreachable(err.to_string()),
        CommandError::Spawn { .. } | CommandError::Io { .. } => FetchError::io(err.to_string()),
    };
    tracing::warn!(kind = ?mapped.kind(), "git failed: {}", mapped);
    mapped
}

fn classify_git_stderr(stderr: &str) -> FetchError {
    const UNKNOWN_REVISION: &[&str] = &["not found in upstream", "remote branch"];
    const UNREACHABLE: &[&str] = &[
        "could not resolve host",
        "unable to access",
        "repository not found",
        "does not exist",
        "could not read from remote",
        "connection refused",
    ];

    let lower = stderr.to_lowercase();
    let message = stderr.trim().to_string();
    if UNKNOWN_REVISION.iter().any(|p| lower.contains(p)) {
        FetchError::unknown_revision(message)
    } else if UNREACHABLE.iter().any(|p| lower.contains(p)) {
        FetchError::unreachable(message)
    } else {
        FetchError::io(message)
    }
}

/// Last path segment of a repository URL without `.git`, safe for a directory name.
fn repo_stem(url: &str) -> String {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(url);
    let stem: String = last
        .trim_end_matches(".git")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "source".to_string()
    } else {
        stem
    }
}
