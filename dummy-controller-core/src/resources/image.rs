use std::str::FromStr;

use thiserror::Error;

use crate::config::{ControllerConfig, POD_IMAGE_ENV};

/// Container image for the pods managed by the controller, parsed from a
/// `<name>:<tag>` reference.
///
/// Registry-qualified references with a port (`registry:5000/app:1.0`)
/// contain an extra colon and are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodImage {
    pub name: String,
    pub tag: String,
    pub full_reference: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Unable to find {} variable with the pod image!", .0)]
    Missing(&'static str),
    #[error("Invalid pod image value '{}', expected <name>:<tag>!", .0)]
    Malformed(String),
}

impl PodImage {
    pub fn resolve(config: &ControllerConfig) -> Result<Self, ImageError> {
        config
            .pod_image
            .as_deref()
            .ok_or(ImageError::Missing(POD_IMAGE_ENV))?
            .parse()
    }
}

impl FromStr for PodImage {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(tag), None) if !name.is_empty() && !tag.is_empty() => Ok(Self {
                name: name.to_owned(),
                tag: tag.to_owned(),
                full_reference: s.to_owned(),
            }),
            _ => Err(ImageError::Malformed(s.to_owned())),
        }
    }
}
