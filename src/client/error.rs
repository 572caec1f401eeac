// ABOUTME: Failure type shared by all stage clients, parameterised by a per-stage kind.
// ABOUTME: Defines FetchError, BuildError, PublishError and DeployError with their kinds.

use std::fmt;
use thiserror::Error;

/// A collaborator failure: what went wrong (`kind`) and the collaborator's
/// own description of it (`message`).
///
/// `Display` prints the message verbatim so that callers see exactly what the
/// external system reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError<K: fmt::Debug> {
    kind: K,
    message: String,
}

impl<K: fmt::Debug + Copy> ClientError<K> {
    pub fn new(kind: K, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Remote could not be reached or does not exist.
    Unreachable,
    /// The requested branch or tag is not known to the remote.
    UnknownRevision,
    /// Local filesystem or process failure.
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildErrorKind {
    /// A build step exited unsuccessfully.
    StepFailed,
    /// The builder could not be started or read its inputs.
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishErrorKind {
    /// The registry refused the image (auth, policy, invalid manifest).
    Rejected,
    /// Transport failure talking to the registry.
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The cluster API refused the workload (validation, quota, RBAC).
    Rejected,
    /// The cluster did not answer in time.
    Timeout,
    /// The object was modified concurrently or already exists in a conflicting form.
    Conflict,
}

pub type FetchError = ClientError<FetchErrorKind>;
pub type BuildError = ClientError<BuildErrorKind>;
pub type PublishError = ClientError<PublishErrorKind>;
pub type DeployError = ClientError<DeployErrorKind>;

impl FetchError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Unreachable, message)
    }

    pub fn unknown_revision(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::UnknownRevision, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Io, message)
    }
}

impl BuildError {
    pub fn step_failed(message: impl Into<String>) -> Self {
        Self::new(BuildErrorKind::StepFailed, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(BuildErrorKind::Io, message)
    }
}

impl PublishError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Rejected, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PublishErrorKind::Network, message)
    }
}

impl DeployError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Rejected, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Timeout, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(DeployErrorKind::Conflict, message)
    }
}
