// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Writes a commented slipway.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ImageRef;

use super::{CONFIG_FILENAME, Config, ConfigError};

pub fn init_config(
    dir: &Path,
    source: Option<&str>,
    image: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(s) = source {
        if s.trim().is_empty() {
            return Err(ConfigError::EmptySourceLocation.into());
        }
        config.pipeline.source_location = s.trim().to_string();
    }

    if let Some(i) = image {
        ImageRef::parse(i).map_err(|source| ConfigError::InvalidImageName {
            name: i.to_string(),
            source,
        })?;
        config.pipeline.image_name = i.trim().to_string();
    }

    std::fs::write(&config_path, generate_template_yaml(&config)?)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> Result<String> {
    let pipeline = &config.pipeline;
    let mut yaml = format!(
        r#"# Repository to build. Append @<branch or tag> to pick a revision.
source_location: {}
image_name: {}
cluster_endpoint: {}

# Reconciled in this order; a failure stops the remaining ones.
deployments:
"#,
        scalar(&pipeline.source_location)?,
        scalar(&pipeline.image_name)?,
        scalar(&pipeline.cluster_endpoint)?,
    );

    for spec in &pipeline.deployments {
        yaml.push_str(&format!(
            "  - name: {}\n    replicas: {}\n    container_port: {}\n",
            scalar(&spec.name)?,
            spec.replicas,
            spec.container_port
        ));
    }

    yaml.push_str(
        r#"
# tools:
#   work_dir: .slipway/work
#   git:
#     timeout: 5m
#   docker:
#     build_timeout: 30m
#     push_timeout: 10m
#   kubectl:
#     namespace: default
#     timeout: 2m
"#,
    );
    Ok(yaml)
}

/// `value` as a single-line YAML scalar, quoted when a plain one would not read back.
fn scalar(value: &str) -> Result<String> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}
