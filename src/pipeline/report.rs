// ABOUTME: Terminal results of a pipeline run.
// ABOUTME: RunReport on success; RunSummary flattens either outcome for display and JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{PipelineError, Stage};
use crate::config::SourceLocation;
use crate::types::{CommitId, DeploymentName, ImageId, ImageRef};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub source: SourceLocation,
    pub commit: Option<CommitId>,
    pub image: ImageRef,
    pub image_id: Option<ImageId>,
    /// Applied deployments, in the order they were reconciled.
    pub deployed: Vec<DeploymentName>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// The terminal result in a flat shape: status, and for failures the stage,
/// the failing deployment (deploy failures only) and the underlying message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunSummary {
    pub fn from_result(result: &Result<RunReport, PipelineError>) -> Self {
        match result {
            Ok(_) => RunSummary {
                status: RunStatus::Succeeded,
                stage: None,
                deployment_index: None,
                deployment: None,
                message: None,
            },
            Err(err) => RunSummary {
                status: RunStatus::Failed,
                stage: err.stage(),
                deployment_index: err.deployment_index(),
                deployment: err.deployment_name().map(ToString::to_string),
                message: Some(err.message()),
            },
        }
    }
}
