use dummy_controller_core::{
    config::ControllerConfig,
    kubernetes::store::{KubeStore, ObjectStore},
    resources::crd::v1alpha1::dummy::Dummy,
};
use k8s_openapi::api::core::v1::Pod;
use kube::Client;

use crate::controller::CONTROLLER_FIELD_MANAGER;

pub struct ReconcilerContext {
    pub config: ControllerConfig,
    pub dummies: Box<dyn ObjectStore<Dummy>>,
    pub pods: Box<dyn ObjectStore<Pod>>,
}

impl ReconcilerContext {
    pub fn new(client: Client, config: ControllerConfig) -> Self {
        Self {
            config,
            dummies: Box::new(KubeStore::new(client.clone(), CONTROLLER_FIELD_MANAGER)),
            pods: Box::new(KubeStore::new(client, CONTROLLER_FIELD_MANAGER)),
        }
    }
}
