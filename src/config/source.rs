// ABOUTME: Source repository location with an optional revision selector.
// ABOUTME: Splits `url@revision` without mistaking scp-style `git@host:path` URLs.

use serde::Serialize;
use std::fmt;

/// Where the source tree comes from and which revision to check out.
///
/// `revision` is `None` when the configuration selects none; fetchers then use
/// the remote's default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    url: String,
    revision: Option<String>,
}

impl SourceLocation {
    pub fn new(url: impl Into<String>, revision: Option<String>) -> Self {
        Self {
            url: url.into(),
            revision,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(ref revision) => write!(f, "{}@{}", self.url, revision),
            None => f.write_str(&self.url),
        }
    }
}

/// Split a trailing `@revision` off a location.
///
/// The part after the last `@` only counts as a revision when it contains no
/// `/` or `:`; otherwise the `@` belongs to the URL (`git@host:org/repo.git`).
/// A trailing bare `@` yields `Some("")` so validation can reject it.
pub(crate) fn split_revision(location: &str) -> (&str, Option<&str>) {
    match location.rsplit_once('@') {
        Some((url, revision)) if !revision.contains('/') && !revision.contains(':') => {
            (url, Some(revision))
        }
        _ => (location, None),
    }
}
