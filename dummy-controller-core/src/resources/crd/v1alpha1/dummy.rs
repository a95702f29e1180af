use std::{fmt::Display, str::FromStr};

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[kube(
    group = "dummy.alexxsilvers",
    version = "v1alpha1",
    kind = "Dummy",
    plural = "dummies",
    namespaced,
    status = "DummyStatus",
    derive = "Default",
    derive = "PartialEq",
    printcolumn = r#"{"name":"Message", "type":"string", "jsonPath":".spec.message"}"#,
    printcolumn = r#"{"name":"Echo", "type":"string", "jsonPath":".status.specEcho"}"#,
    printcolumn = r#"{"name":"Pod", "type":"string", "jsonPath":".status.podStatus"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct DummySpec {
    /// message echoed back into the status by the controller
    pub message: String,
}

#[skip_serializing_none]
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DummyStatus {
    /// last `spec.message` observed by the controller
    #[serde(default)]
    pub spec_echo: String,
    /// phase of the pod managed for this dummy
    pub pod_status: Option<PodPhase>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Unrecognized phases are reported as `Unknown`
    pub fn from_phase(phase: &str) -> Self {
        phase.parse().unwrap_or(PodPhase::Unknown)
    }
}

impl FromStr for PodPhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PodPhase::Pending),
            "Running" => Ok(PodPhase::Running),
            "Succeeded" => Ok(PodPhase::Succeeded),
            "Failed" => Ok(PodPhase::Failed),
            "Unknown" => Ok(PodPhase::Unknown),
            _ => Err(()),
        }
    }
}

impl Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodPhase::Pending => f.write_str("Pending"),
            PodPhase::Running => f.write_str("Running"),
            PodPhase::Succeeded => f.write_str("Succeeded"),
            PodPhase::Failed => f.write_str("Failed"),
            PodPhase::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Dummy {
    pub fn spec_echo(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.spec_echo.as_str())
    }

    pub fn pod_status(&self) -> Option<PodPhase> {
        self.status.as_ref().and_then(|status| status.pod_status)
    }
}
