// ABOUTME: Terminal failure of a pipeline run, tagged with the stage that failed.
// ABOUTME: Uses SNAFU context selectors and exposes stage/index/message for programmatic handling.

use serde::Serialize;
use snafu::Snafu;
use std::fmt;

use crate::client::{BuildError, DeployError, FetchError, PublishError};
use crate::config::ConfigError;
use crate::types::DeploymentName;

/// One of the four ordered pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Build,
    Push,
    Deploy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Fetch => "fetch",
            Stage::Build => "build",
            Stage::Push => "push",
            Stage::Deploy => "deploy",
        })
    }
}

/// Why a run stopped. The first failure ends the run; nothing is retried or undone.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PipelineError {
    #[snafu(display("invalid configuration: {source}"))]
    Config { source: ConfigError },

    #[snafu(display("fetch failed: {source}"))]
    Fetch { source: FetchError },

    #[snafu(display("build failed: {source}"))]
    Build { source: BuildError },

    #[snafu(display("push failed: {source}"))]
    Push { source: PublishError },

    #[snafu(display("deployment #{index} ({name}) failed: {source}"))]
    Deploy {
        index: usize,
        name: DeploymentName,
        source: DeployError,
    },

    #[snafu(display("run cancelled during {stage}"))]
    Cancelled {
        stage: Stage,
        deployment_index: Option<usize>,
    },
}

impl PipelineError {
    /// The stage that failed. `None` when the configuration was rejected
    /// before any stage started.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Config { .. } => None,
            PipelineError::Fetch { .. } => Some(Stage::Fetch),
            PipelineError::Build { .. } => Some(Stage::Build),
            PipelineError::Push { .. } => Some(Stage::Push),
            PipelineError::Deploy { .. } => Some(Stage::Deploy),
            PipelineError::Cancelled { stage, .. } => Some(*stage),
        }
    }

    /// Position of the failing deployment in configured order.
    pub fn deployment_index(&self) -> Option<usize> {
        match self {
            PipelineError::Deploy { index, .. } => Some(*index),
            PipelineError::Cancelled {
                deployment_index, ..
            } => *deployment_index,
            _ => None,
        }
    }

    pub fn deployment_name(&self) -> Option<&DeploymentName> {
        match self {
            PipelineError::Deploy { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The underlying failure without stage context.
    pub fn message(&self) -> String {
        match self {
            PipelineError::Config { source } => source.to_string(),
            PipelineError::Fetch { source } => source.message().to_string(),
            PipelineError::Build { source } => source.message().to_string(),
            PipelineError::Push { source } => source.message().to_string(),
            PipelineError::Deploy { source, .. } => source.message().to_string(),
            PipelineError::Cancelled { .. } => "cancelled".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}
