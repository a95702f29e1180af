use std::{env::var, num::ParseIntError, time::Duration};

use thiserror::Error;

pub const POD_IMAGE_ENV: &str = "POD_IMAGE";
pub const RESYNC_SECS_ENV: &str = "DUMMY_RESYNC_SECS";

const DEFAULT_RESYNC_SECS: u64 = 60 * 5;

/// Settings the controller reads once at startup and hands to every
/// reconciliation pass.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// raw `<name>:<tag>` reference, validated only when a pod is about to be created
    pub pod_image: Option<String>,
    /// how long to wait before re-checking a converged object
    pub resync_interval: Duration,
}

#[derive(Debug, Error)]
pub enum FromError {
    #[error("{} couldn't be parsed as a number of seconds: {}", .0, .1)]
    InvalidSeconds(&'static str, ParseIntError),
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pod_image: None,
            resync_interval: Duration::from_secs(DEFAULT_RESYNC_SECS),
        }
    }
}

impl ControllerConfig {
    pub fn from_env() -> Result<Self, FromError> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FromError> {
        let resync_interval = match lookup(RESYNC_SECS_ENV) {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .map_err(|err| FromError::InvalidSeconds(RESYNC_SECS_ENV, err))?,
            ),
            None => Duration::from_secs(DEFAULT_RESYNC_SECS),
        };

        Ok(Self {
            pod_image: lookup(POD_IMAGE_ENV),
            resync_interval,
        })
    }

    pub fn with_pod_image(image: &str) -> Self {
        Self {
            pod_image: Some(image.to_owned()),
            ..Default::default()
        }
    }
}
