use std::sync::Arc;

use dummy_controller_core::config::ControllerConfig;
use kube::Client;

use self::{dummy::start_dummy_controller, reconciler::context::ReconcilerContext};

pub mod dummy;
pub mod reconciler;

pub const CONTROLLER_FIELD_MANAGER: &str = "dummy-controller";

pub async fn main_controller(client: Client, config: ControllerConfig, namespace: Option<String>) {
    let reconciler_context = ReconcilerContext::new(client.clone(), config);

    start_dummy_controller(&client, namespace.as_deref(), Arc::new(reconciler_context)).await
}
