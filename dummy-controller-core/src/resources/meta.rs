use crate::kubernetes::store::ObjectKey;

use super::crd::v1alpha1::dummy::Dummy;

pub trait TryDummyMeta {
    fn try_get_pod_name(&self) -> Option<String>;
    fn try_get_pod_key(&self) -> Option<ObjectKey>;
}

pub fn get_pod_name(dummy_name: &str) -> String {
    format!("{dummy_name}-pod")
}

impl TryDummyMeta for Dummy {
    fn try_get_pod_name(&self) -> Option<String> {
        self.metadata.name.as_deref().map(get_pod_name)
    }

    fn try_get_pod_key(&self) -> Option<ObjectKey> {
        Some(ObjectKey::new(
            self.metadata.namespace.as_deref()?,
            &self.try_get_pod_name()?,
        ))
    }
}
