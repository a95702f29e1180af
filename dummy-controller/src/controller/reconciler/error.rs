use dummy_controller_core::{
    kubernetes::store::StoreError,
    resources::{image::ImageError, ResourceGenerationError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Object is missing metadata!")]
    MissingObjectMetadata,
    #[error("Couldn't resolve the pod image! Reason: {}", .0)]
    ConfigurationError(ImageError),
    #[error("Couldn't prepare the pod definition! Reason: {}", .0)]
    OwnershipLinkError(ResourceGenerationError),
    #[error("Couldn't access the resource! Reason: {}", .0)]
    StoreError(StoreError),
}

impl ReconcilerError {
    /// Errors that keep failing until someone fixes the deployment
    pub fn needs_operator(&self) -> bool {
        matches!(
            self,
            ReconcilerError::ConfigurationError(_) | ReconcilerError::OwnershipLinkError(_)
        )
    }
}
