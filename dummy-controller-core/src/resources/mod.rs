use std::borrow::Cow;

use thiserror::Error;

pub mod crd;
pub mod image;
pub mod labels;
pub mod meta;
pub mod pod;

#[derive(Debug, Error)]
pub enum ResourceGenerationError {
    #[error("Resource is missing required data ({})!", .0)]
    MissingData(Cow<'static, str>),
    #[error("Couldn't link the resource to its owner, the owner is missing a name or uid!")]
    MissingOwnerReference,
}
