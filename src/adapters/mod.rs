// ABOUTME: Stage clients implemented over the git, docker and kubectl command lines.
// ABOUTME: Each adapter maps tool failures onto the stage's error kinds.

mod docker;
mod git;
mod kubectl;

pub use docker::DockerCli;
pub use git::GitFetcher;
pub use kubectl::{KubectlDeployer, deployment_manifest};

use crate::config::Config;

/// The command-line clients for one configuration.
pub fn from_config(config: &Config) -> (GitFetcher, DockerCli, KubectlDeployer) {
    let tools = &config.tools;
    (
        GitFetcher::new(tools.git.clone(), tools.work_dir.clone()),
        DockerCli::new(tools.docker.clone()),
        KubectlDeployer::new(
            config.pipeline.cluster_endpoint.clone(),
            tools.kubectl.clone(),
        ),
    )
}
