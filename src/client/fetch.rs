// ABOUTME: Source fetching capability and the source-tree handle it produces.
// ABOUTME: Implemented by GitFetcher and by test doubles.

use super::error::FetchError;
use crate::config::SourceLocation;
use crate::types::CommitId;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A checked-out source tree, owned by the run that fetched it.
///
/// A tree built with [`SourceTree::owned`] removes its directory once the
/// last handle to it is dropped.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    commit: Option<CommitId>,
    checkout: Option<Arc<TempDir>>,
}

impl SourceTree {
    /// A tree at `root` that the caller keeps on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            commit: None,
            checkout: None,
        }
    }

    /// A tree that deletes `checkout` when dropped.
    pub fn owned(checkout: TempDir) -> Self {
        Self {
            root: checkout.path().to_path_buf(),
            commit: None,
            checkout: Some(Arc::new(checkout)),
        }
    }

    pub fn with_commit(mut self, commit: CommitId) -> Self {
        self.commit = Some(commit);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The commit the revision selector resolved to, when the fetcher reports one.
    pub fn commit(&self) -> Option<&CommitId> {
        self.commit.as_ref()
    }
}

/// Retrieves a source tree from a repository.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch `source.url()` at `source.revision()`, or the remote's default
    /// branch when no revision is selected.
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError>;
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for &T {
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError> {
        (**self).fetch(source).await
    }
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for Arc<T> {
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError> {
        (**self).fetch(source).await
    }
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for Box<T> {
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError> {
        (**self).fetch(source).await
    }
}
