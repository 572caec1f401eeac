// ABOUTME: ImageBuilder backed by the docker command line.
// ABOUTME: Builds the fetched tree with `docker build` and publishes with `docker push`.

use async_trait::async_trait;

use crate::client::{BuildContext, BuildError, ImageBuilder, PublishError, SourceTree};
use crate::config::DockerConfig;
use crate::process::{CommandError, CommandSpec};
use crate::types::{ImageId, ImageRef};

#[derive(Debug, Clone)]
pub struct DockerCli {
    config: DockerConfig,
}

impl DockerCli {
    pub fn new(config: DockerConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, tree: &SourceTree, image: &ImageRef) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.config.binary)
            .timeout(self.config.build_timeout)
            .args(["build", "--quiet", "--tag"])
            .arg(image.to_string());
        if let Some(ref dockerfile) = self.config.dockerfile {
            cmd = cmd
                .arg("--file")
                .arg(tree.root().join(dockerfile).to_string_lossy());
        }
        cmd.arg(tree.root().to_string_lossy())
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError> {
        let output = self
            .build_command(tree, image)
            .run()
            .await
            .map_err(map_build_error)?;

        // With --quiet, stdout is the image id alone.
        let id = output.stdout.trim();
        let context = BuildContext::new(image.clone());
        Ok(if id.is_empty() {
            context
        } else {
            context.with_image_id(ImageId::new(id))
        })
    }

    async fn push(&self, _context: &BuildContext, image: &ImageRef) -> Result<(), PublishError> {
        CommandSpec::new(&self.config.binary)
            .timeout(self.config.push_timeout)
            .arg("push")
            .arg(image.to_string())
            .run()
            .await
            .map_err(map_push_error)?;
        Ok(())
    }
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_build_error(err: CommandError) -> BuildError {
    let mapped = match err {
        CommandError::Exited { ref stderr, .. } => BuildError::step_failed(stderr.trim()),
        CommandError::TimedOut { .. } => BuildError::step_failed(err.to_string()),
        CommandError::Spawn { .. } | CommandError::Io { .. } => BuildError::io(err.to_string()),
    };
    tracing::warn!(kind = ?mapped.kind(), "docker build failed: {}", mapped);
    mapped
}

fn map_push_error(err: CommandError) -> PublishError {
    let mapped = match err {
        CommandError::Exited { ref stderr, .. } => classify_push_stderr(stderr),
        _ => PublishError::network(err.to_string()),
    };
    tracing::warn!(kind = ?mapped.kind(), "docker push failed: {}", mapped);
    mapped
}

fn classify_push_stderr(stderr: &str) -> PublishError {
    const REJECTED: &[&str] = &[
        "denied",
        "unauthorized",
        "authentication required",
        "manifest invalid",
        "does not exist",
    ];

    let lower = stderr.to_lowercase();
    let message = stderr.trim().to_string();
    if REJECTED.iter().any(|p| lower.contains(p)) {
        PublishError::rejected(message)
    } else {
        PublishError::network(message)
    }
}
