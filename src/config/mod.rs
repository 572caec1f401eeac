// ABOUTME: Configuration types and parsing for slipway.yml.
// ABOUTME: Handles YAML parsing, file discovery, validation and tool settings.

mod error;
mod init;
mod pipeline;
mod source;
mod tools;

pub use error::ConfigError;
pub use init::init_config;
pub use pipeline::{DeploymentSpec, DeploymentTarget, PipelineConfig, RunPlan};
pub use source::SourceLocation;
pub use tools::{DockerConfig, GitConfig, KubectlConfig, ToolsConfig};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "slipway.yml";
pub const CONFIG_FILENAME_ALT: &str = "slipway.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".slipway/config.yml";

/// Contents of a configuration file: the pipeline record plus the settings
/// for the tools that carry it out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Load an explicit file when given, otherwise discover one in `dir`.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::discover(dir),
        }
    }

    pub fn template() -> Self {
        Config {
            pipeline: PipelineConfig {
                source_location: "https://example.com/my-app.git@main".to_string(),
                revision: None,
                image_name: "registry.example.com/my-app:latest".to_string(),
                cluster_endpoint: "https://kubernetes.example.com".to_string(),
                deployments: vec![DeploymentSpec::new("my-app", 3, 8080)],
            },
            tools: ToolsConfig::default(),
        }
    }
}
