// ABOUTME: The flat record describing one pipeline run, and its validation.
// ABOUTME: Validation turns a PipelineConfig into a typed RunPlan or a ConfigError.

use serde::Deserialize;
use std::collections::HashSet;

use super::error::ConfigError;
use super::source::{SourceLocation, split_revision};
use crate::types::{DeploymentName, ImageRef};

/// One pipeline run: where the source lives, what image to produce, and which
/// workloads to reconcile against which cluster.
///
/// Integer fields are signed so that out-of-range input survives parsing and
/// is reported by [`PipelineConfig::validate`] rather than by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    pub source_location: String,

    #[serde(default)]
    pub revision: Option<String>,

    pub image_name: String,

    #[serde(default)]
    pub cluster_endpoint: String,

    #[serde(default)]
    pub deployments: Vec<DeploymentSpec>,
}

/// A named workload with its desired replica count and exposed port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentSpec {
    pub name: String,

    #[serde(alias = "replica_count")]
    pub replicas: i32,

    #[serde(alias = "port")]
    pub container_port: i32,
}

impl DeploymentSpec {
    pub fn new(name: impl Into<String>, replicas: i32, container_port: i32) -> Self {
        Self {
            name: name.into(),
            replicas,
            container_port,
        }
    }
}

/// A validated configuration, ready to drive a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub source: SourceLocation,
    pub image: ImageRef,
    pub cluster_endpoint: Option<String>,
    pub deployments: Vec<DeploymentTarget>,
}

/// A deployment spec after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub name: DeploymentName,
    pub replicas: u32,
    pub container_port: u16,
}

impl PipelineConfig {
    /// Check every invariant without producing a plan.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.plan().map(drop)
    }

    /// Validate and resolve into a typed plan.
    ///
    /// Reports the first violation, checking source, revision, image, each
    /// deployment in order, then the cluster endpoint.
    pub fn plan(&self) -> Result<RunPlan, ConfigError> {
        let source = self.source()?;
        let image = self.image()?;
        let deployments = self.targets()?;

        let endpoint = self.cluster_endpoint.trim();
        if endpoint.is_empty() && !deployments.is_empty() {
            return Err(ConfigError::MissingClusterEndpoint);
        }

        Ok(RunPlan {
            source,
            image,
            cluster_endpoint: (!endpoint.is_empty()).then(|| endpoint.to_string()),
            deployments,
        })
    }

    fn source(&self) -> Result<SourceLocation, ConfigError> {
        let location = self.source_location.trim();
        let (url, suffix) = split_revision(location);
        if url.trim().is_empty() {
            return Err(ConfigError::EmptySourceLocation);
        }

        let explicit = self.revision.as_deref().map(str::trim);
        let revision = match (suffix, explicit) {
            (Some(""), _) | (_, Some("")) => return Err(ConfigError::EmptyRevision),
            (Some(location), Some(explicit)) if location != explicit => {
                return Err(ConfigError::ConflictingRevision {
                    location: location.to_string(),
                    explicit: explicit.to_string(),
                });
            }
            (Some(revision), _) | (None, Some(revision)) => Some(revision.to_string()),
            (None, None) => None,
        };

        Ok(SourceLocation::new(url.trim(), revision))
    }

    fn image(&self) -> Result<ImageRef, ConfigError> {
        if self.image_name.trim().is_empty() {
            return Err(ConfigError::EmptyImageName);
        }
        ImageRef::parse(&self.image_name).map_err(|source| ConfigError::InvalidImageName {
            name: self.image_name.clone(),
            source,
        })
    }

    fn targets(&self) -> Result<Vec<DeploymentTarget>, ConfigError> {
        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.deployments.len());

        for (index, spec) in self.deployments.iter().enumerate() {
            let name = DeploymentName::new(&spec.name)
                .map_err(|source| ConfigError::InvalidDeploymentName { index, source })?;

            let replicas =
                u32::try_from(spec.replicas).map_err(|_| ConfigError::NegativeReplicas {
                    name: spec.name.clone(),
                    replicas: spec.replicas,
                })?;

            let container_port = u16::try_from(spec.container_port)
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| ConfigError::PortOutOfRange {
                    name: spec.name.clone(),
                    port: spec.container_port,
                })?;

            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateDeploymentName(spec.name.clone()));
            }

            targets.push(DeploymentTarget {
                name,
                replicas,
                container_port,
            });
        }

        Ok(targets)
    }
}
