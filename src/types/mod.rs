// ABOUTME: Validated domain types shared by config, stage clients and the orchestrator.
// ABOUTME: Uses phantom types to keep artifact IDs from being confused.

mod deployment_name;
mod id;
mod image_ref;

pub use deployment_name::{DeploymentName, DeploymentNameError};
pub use id::{CommitId, Id, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
