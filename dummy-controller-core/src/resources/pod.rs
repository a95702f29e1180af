use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use kube::{core::ObjectMeta, Resource};

use super::{
    crd::v1alpha1::dummy::Dummy, image::PodImage, labels::get_pod_labels, meta::TryDummyMeta,
    ResourceGenerationError,
};

pub const POD_IMAGE_PULL_POLICY: &str = "IfNotPresent";

impl Dummy {
    /// Builds the pod backing this dummy. The pod is owned by the dummy, so
    /// removing the dummy makes the garbage collector reclaim it.
    pub fn generate_pod(&self, image: &PodImage) -> Result<Pod, ResourceGenerationError> {
        let name = self
            .metadata
            .name
            .as_deref()
            .ok_or(ResourceGenerationError::MissingData("metadata.name".into()))?;
        let namespace = self
            .metadata
            .namespace
            .as_deref()
            .ok_or(ResourceGenerationError::MissingData("metadata.namespace".into()))?;
        let owner = self
            .controller_owner_ref(&())
            .ok_or(ResourceGenerationError::MissingOwnerReference)?;

        Ok(Pod {
            metadata: ObjectMeta {
                name: self.try_get_pod_name(),
                namespace: Some(namespace.to_owned()),
                labels: Some(get_pod_labels(name, image)),
                owner_references: Some(vec![owner]),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: image.name.to_owned(),
                    image: Some(image.full_reference.to_owned()),
                    image_pull_policy: Some(POD_IMAGE_PULL_POLICY.to_owned()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}
