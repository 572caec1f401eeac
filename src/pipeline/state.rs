// ABOUTME: Observable run states and the type-state markers that carry stage artifacts.
// ABOUTME: RunState encodes the legal transitions; markers enforce stage order at compile time.

use serde::Serialize;
use std::fmt;

use crate::client::{BuildContext, SourceTree};
use crate::types::DeploymentName;

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Fetching,
    Building,
    Publishing,
    /// Reconciling the deployment at `index` in configured order.
    Deploying { index: usize },
    Succeeded,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }

    /// Whether `next` may follow `self`. Terminal states have no successors.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        use RunState as S;

        match (self, next) {
            (S::Pending, S::Fetching)
            | (S::Fetching, S::Building)
            | (S::Building, S::Publishing) => true,
            (S::Publishing, S::Deploying { index: 0 }) | (S::Publishing, S::Succeeded) => true,
            (S::Deploying { index }, S::Deploying { index: next }) => *next == index + 1,
            (S::Deploying { .. }, S::Succeeded) => true,
            (current, S::Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => f.write_str("pending"),
            RunState::Fetching => f.write_str("fetching"),
            RunState::Building => f.write_str("building"),
            RunState::Publishing => f.write_str("publishing"),
            RunState::Deploying { index } => write!(f, "deploying[{}]", index),
            RunState::Succeeded => f.write_str("succeeded"),
            RunState::Failed => f.write_str("failed"),
        }
    }
}

/// Configuration validated, nothing fetched yet.
/// Available actions: `fetch()`
#[derive(Debug)]
pub struct Pending;

/// Source tree checked out.
/// Available actions: `build()`
#[derive(Debug)]
pub struct Fetched {
    pub(crate) tree: SourceTree,
}

/// Image built from the tree.
/// Available actions: `push()`
#[derive(Debug)]
pub struct Built {
    pub(crate) tree: SourceTree,
    pub(crate) context: BuildContext,
}

/// Image published to the registry.
/// Available actions: `deploy_all()`
#[derive(Debug)]
pub struct Published {
    pub(crate) tree: SourceTree,
    pub(crate) context: BuildContext,
}

/// Every deployment applied.
/// Available actions: `finish()`
#[derive(Debug)]
pub struct Completed {
    pub(crate) tree: SourceTree,
    pub(crate) context: BuildContext,
    pub(crate) deployed: Vec<DeploymentName>,
}
