use std::{future::Ready, sync::Arc};

use dummy_controller_core::resources::crd::v1alpha1::dummy::Dummy;
use futures::StreamExt;
use k8s_openapi::{api::core::v1::Pod, NamespaceResourceScope};
use kube::{
    runtime::{
        controller::{Action, Error as ControllerError},
        reflector::ObjectRef,
        watcher::{self, Config},
        Controller,
    },
    Api, Client, Resource,
};
use log::{debug, error, info, warn};

use super::reconciler::{
    context::ReconcilerContext,
    dummy::{reconcile_dummy, reconcile_dummy_error},
    error::ReconcilerError,
};

type DummyReconciliation =
    Result<(ObjectRef<Dummy>, Action), ControllerError<ReconcilerError, watcher::Error>>;

fn watched_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
{
    match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}

pub async fn start_dummy_controller(
    client: &Client,
    namespace: Option<&str>,
    context: Arc<ReconcilerContext>,
) {
    info!(
        "Creating dummy controller watching {}...",
        namespace.map_or("all namespaces".to_owned(), |ns| format!("'{ns}' namespace"))
    );

    let watcher_config = Config::default();
    let controller = Controller::new(watched_api::<Dummy>(client, namespace), watcher_config.clone())
        .owns(watched_api::<Pod>(client, namespace), watcher_config)
        .shutdown_on_signal()
        .run(reconcile_dummy, reconcile_dummy_error, context)
        .for_each(log_reconciliation_result);

    info!("Dummy controller created!");

    controller.await;

    info!("Dummy controller stopped");
}

fn log_reconciliation_result(result: DummyReconciliation) -> Ready<()> {
    match result {
        Ok((dummy, action)) => debug!(
            "Dummy '{}' in '{}' namespace reconciled, next pass: {action:?}",
            dummy.name,
            dummy.namespace.as_deref().unwrap_or("---")
        ),
        Err(ControllerError::ObjectNotFound(dummy)) => {
            debug!("Dummy '{}' was deleted before its pass", dummy.name)
        }
        Err(ControllerError::ReconcilerFailed(err, dummy)) if err.needs_operator() => error!(
            "Dummy '{}' in '{}' namespace can't converge until the deployment is fixed: {err}",
            dummy.name,
            dummy.namespace.as_deref().unwrap_or("---")
        ),
        Err(ControllerError::ReconcilerFailed(err, dummy)) => warn!(
            "Dummy '{}' in '{}' namespace failed to reconcile, retrying: {err}",
            dummy.name,
            dummy.namespace.as_deref().unwrap_or("---")
        ),
        Err(ControllerError::QueueError(err)) => error!("Dummy watcher has failed! {err:#?}"),
    }

    std::future::ready(())
}
