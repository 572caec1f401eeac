// ABOUTME: Validation errors for pipeline configuration.
// ABOUTME: One variant per violated invariant, raised before any collaborator is contacted.

use crate::types::{DeploymentNameError, ParseImageRefError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("source location cannot be empty")]
    EmptySourceLocation,

    #[error("revision cannot be empty")]
    EmptyRevision,

    #[error("source location selects revision {location:?} but revision is set to {explicit:?}")]
    ConflictingRevision { location: String, explicit: String },

    #[error("image name cannot be empty")]
    EmptyImageName,

    #[error("invalid image name {name:?}: {source}")]
    InvalidImageName {
        name: String,
        source: ParseImageRefError,
    },

    #[error("cluster endpoint is required when deployments are configured")]
    MissingClusterEndpoint,

    #[error("deployment #{index} has an invalid name: {source}")]
    InvalidDeploymentName {
        index: usize,
        source: DeploymentNameError,
    },

    #[error("deployment name {0:?} is used more than once")]
    DuplicateDeploymentName(String),

    #[error("deployment {name:?}: replica count must be >= 0, got {replicas}")]
    NegativeReplicas { name: String, replicas: i32 },

    #[error("deployment {name:?}: container port must be within 1-65535, got {port}")]
    PortOutOfRange { name: String, port: i32 },
}
