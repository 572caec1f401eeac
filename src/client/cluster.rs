// ABOUTME: Cluster deployment capability.
// ABOUTME: Reconciles one named workload at a time against the target cluster.

use super::error::DeployError;
use crate::config::DeploymentTarget;
use crate::types::ImageRef;
use async_trait::async_trait;
use std::sync::Arc;

/// Applies workloads to a cluster control plane.
///
/// Implementations are bound to one cluster endpoint when constructed and own
/// their timeout policy.
#[async_trait]
pub trait ClusterDeployer: Send + Sync {
    /// Create or update `target.name` to run `image` with the target's replica
    /// count and container port.
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError>;
}

#[async_trait]
impl<T: ClusterDeployer + ?Sized> ClusterDeployer for &T {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError> {
        (**self).deploy(target, image).await
    }
}

#[async_trait]
impl<T: ClusterDeployer + ?Sized> ClusterDeployer for Arc<T> {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError> {
        (**self).deploy(target, image).await
    }
}

#[async_trait]
impl<T: ClusterDeployer + ?Sized> ClusterDeployer for Box<T> {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError> {
        (**self).deploy(target, image).await
    }
}
