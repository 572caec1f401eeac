// ABOUTME: Image build and publish capability, plus the build-context handle.
// ABOUTME: Build consumes a source tree; push consumes the resulting build context.

use super::error::{BuildError, PublishError};
use super::fetch::SourceTree;
use crate::types::{ImageId, ImageRef};
use async_trait::async_trait;
use std::sync::Arc;

/// The result of a build, owned by the run until it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    image: ImageRef,
    image_id: Option<ImageId>,
}

impl BuildContext {
    pub fn new(image: ImageRef) -> Self {
        Self {
            image,
            image_id: None,
        }
    }

    pub fn with_image_id(mut self, image_id: ImageId) -> Self {
        self.image_id = Some(image_id);
        self
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn image_id(&self) -> Option<&ImageId> {
        self.image_id.as_ref()
    }
}

/// Builds images from source trees and publishes them to a registry.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Build `tree` into an image tagged `image`.
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError>;

    /// Publish a previously built image under `image`.
    async fn push(&self, context: &BuildContext, image: &ImageRef) -> Result<(), PublishError>;
}

#[async_trait]
impl<T: ImageBuilder + ?Sized> ImageBuilder for &T {
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError> {
        (**self).build(tree, image).await
    }

    async fn push(&self, context: &BuildContext, image: &ImageRef) -> Result<(), PublishError> {
        (**self).push(context, image).await
    }
}

#[async_trait]
impl<T: ImageBuilder + ?Sized> ImageBuilder for Arc<T> {
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError> {
        (**self).build(tree, image).await
    }

    async fn push(&self, context: &BuildContext, image: &ImageRef) -> Result<(), PublishError> {
        (**self).push(context, image).await
    }
}

#[async_trait]
impl<T: ImageBuilder + ?Sized> ImageBuilder for Box<T> {
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError> {
        (**self).build(tree, image).await
    }

    async fn push(&self, context: &BuildContext, image: &ImageRef) -> Result<(), PublishError> {
        (**self).push(context, image).await
    }
}
