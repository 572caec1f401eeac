// ABOUTME: Capability traits for the external systems a pipeline run drives.
// ABOUTME: Defines SourceFetcher, ImageBuilder and ClusterDeployer with their handles and errors.

mod cluster;
mod error;
mod fetch;
mod image;

pub use cluster::ClusterDeployer;
pub use error::{
    BuildError, BuildErrorKind, ClientError, DeployError, DeployErrorKind, FetchError,
    FetchErrorKind, PublishError, PublishErrorKind,
};
pub use fetch::{SourceFetcher, SourceTree};
pub use image::{BuildContext, ImageBuilder};
