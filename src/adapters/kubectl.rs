// ABOUTME: ClusterDeployer backed by `kubectl apply`.
// ABOUTME: Renders an apps/v1 Deployment manifest as JSON and pipes it to kubectl on stdin.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{ClusterDeployer, DeployError};
use crate::config::{DeploymentTarget, KubectlConfig};
use crate::process::{CommandError, CommandSpec};
use crate::types::ImageRef;

const MANAGED_BY: &str = "slipway";

/// Applies deployments to the cluster at one API endpoint.
#[derive(Debug, Clone)]
pub struct KubectlDeployer {
    endpoint: String,
    config: KubectlConfig,
}

impl KubectlDeployer {
    pub fn new(endpoint: impl Into<String>, config: KubectlConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            config,
        }
    }

    fn apply_command(&self, manifest: &Value) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.config.binary)
            .timeout(self.config.timeout)
            .args(["--server", self.endpoint.as_str()]);
        if let Some(ref namespace) = self.config.namespace {
            cmd = cmd.args(["--namespace", namespace.as_str()]);
        }
        if let Some(ref context) = self.config.context {
            cmd = cmd.args(["--context", context.as_str()]);
        }
        cmd.args(["apply", "-f", "-"]).stdin(manifest.to_string())
    }
}

/// The Deployment object that runs `image` as `target`.
pub fn deployment_manifest(
    target: &DeploymentTarget,
    image: &ImageRef,
    namespace: Option<&str>,
) -> Value {
    let name = target.name.as_str();
    let labels = json!({
        "app.kubernetes.io/name": name,
        "app.kubernetes.io/managed-by": MANAGED_BY,
    });

    let mut metadata = json!({
        "name": name,
        "labels": labels,
    });
    if let Some(namespace) = namespace {
        metadata["namespace"] = json!(namespace);
    }

    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": metadata,
        "spec": {
            "replicas": target.replicas,
            "selector": { "matchLabels": { "app.kubernetes.io/name": name } },
            "template": {
                "metadata": { "labels": labels },
                "spec": {
                    "containers": [{
                        "name": name,
                        "image": image.to_string(),
                        "ports": [{ "containerPort": target.container_port }],
                    }],
                },
            },
        },
    })
}

#[async_trait]
impl ClusterDeployer for KubectlDeployer {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError> {
        let manifest = deployment_manifest(target, image, self.config.namespace.as_deref());
        let output = self
            .apply_command(&manifest)
            .run()
            .await
            .map_err(map_deploy_error)?;
        tracing::debug!(name = %target.name, result = output.stdout.trim(), "kubectl apply");
        Ok(())
    }
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_deploy_error(err: CommandError) -> DeployError {
    let mapped = match err {
        CommandError::Exited { ref stderr, .. } => classify_kubectl_stderr(stderr),
        CommandError::TimedOut { .. } => DeployError::timeout(err.to_string()),
        CommandError::Spawn { .. } | CommandError::Io { .. } => {
            DeployError::rejected(err.to_string())
        }
    };
    tracing::warn!(kind = ?mapped.kind(), "kubectl apply failed: {}", mapped);
    mapped
}

fn classify_kubectl_stderr(stderr: &str) -> DeployError {
    const CONFLICT: &[&str] = &[
        "conflict",
        "alreadyexists",
        "already exists",
        "has been modified",
    ];
    const TIMEOUT: &[&str] = &[
        "timeout",
        "timed out",
        "deadline exceeded",
        "unable to connect to the server",
        "connection refused",
    ];

    let lower = stderr.to_lowercase();
    let message = stderr.trim().to_string();
    if CONFLICT.iter().any(|p| lower.contains(p)) {
        DeployError::conflict(message)
    } else if TIMEOUT.iter().any(|p| lower.contains(p)) {
        DeployError::timeout(message)
    } else {
        DeployError::rejected(message)
    }
}
