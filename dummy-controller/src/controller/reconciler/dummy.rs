use std::{sync::Arc, time::Duration};

use dummy_controller_core::{
    helpers::HasFinalizer,
    kubernetes::{
        lifecycle::Lifecycle,
        store::{CreateOutcome, ObjectKey, Versioned, WriteOutcome},
    },
    resources::{
        crd::v1alpha1::dummy::{Dummy, PodPhase},
        image::PodImage,
        meta::TryDummyMeta,
    },
    DUMMY_FINALIZER,
};
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::controller::Action;
use log::{debug, info};

use super::{context::ReconcilerContext, error::ReconcilerError, PassOutcome};

const CONFLICT_REQUEUE_SECS: u64 = 1;

const DEFAULT_ERROR_REQUEUE_SECS: u64 = 10;
const CONFIGURATION_ERROR_REQUEUE_SECS: u64 = 60;

enum Step<T> {
    Continue(T),
    Finish(PassOutcome),
}

pub async fn reconcile_dummy(
    object: Arc<Dummy>,
    context: Arc<ReconcilerContext>,
) -> Result<Action, ReconcilerError> {
    let key = ObjectKey::of(object.as_ref()).ok_or(ReconcilerError::MissingObjectMetadata)?;

    Ok(match reconcile_pass(&key, &context).await? {
        PassOutcome::Done => Action::requeue(context.config.resync_interval),
        PassOutcome::Retry => {
            debug!("Dummy '{key}' changed during the pass, running another one shortly");
            Action::requeue(Duration::from_secs(CONFLICT_REQUEUE_SECS))
        }
    })
}

pub fn reconcile_dummy_error(
    _object: Arc<Dummy>,
    error: &ReconcilerError,
    _context: Arc<ReconcilerContext>,
) -> Action {
    Action::requeue(match error {
        ReconcilerError::ConfigurationError(_) => {
            Duration::from_secs(CONFIGURATION_ERROR_REQUEUE_SECS)
        }
        _ => Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
    })
}

/// Runs one convergence pass for the dummy identified by `key`.
///
/// Only the current state of the store is taken into account, so the pass
/// can be repeated any number of times. Every write is either the last thing
/// the pass does or is followed by a fresh read of the object.
pub async fn reconcile_pass(
    key: &ObjectKey,
    context: &ReconcilerContext,
) -> Result<PassOutcome, ReconcilerError> {
    let dummy = match Lifecycle::of(fetch_dummy(key, context).await?) {
        Lifecycle::Active(dummy) | Lifecycle::PendingDeletion(dummy) => dummy,
        Lifecycle::Gone => {
            debug!("Dummy '{key}' is gone, nothing to reconcile");
            return Ok(PassOutcome::Done);
        }
    };

    info!(
        "Processing Dummy '{}' in '{}' namespace, message '{}'",
        key.name,
        key.namespace,
        dummy.object().spec.message
    );

    let lifecycle = match echo_spec(key, dummy, context).await? {
        Step::Continue(lifecycle) => lifecycle,
        Step::Finish(outcome) => return Ok(outcome),
    };

    match lifecycle {
        Lifecycle::Active(dummy) => {
            let dummy = match ensure_finalizer(key, dummy, context).await? {
                Step::Continue(dummy) => dummy,
                Step::Finish(outcome) => return Ok(outcome),
            };

            sync_pod(key, dummy, context).await
        }
        Lifecycle::PendingDeletion(dummy) => finalize(key, dummy, context).await,
        Lifecycle::Gone => Ok(PassOutcome::Done),
    }
}

async fn fetch_dummy(
    key: &ObjectKey,
    context: &ReconcilerContext,
) -> Result<Option<Versioned<Dummy>>, ReconcilerError> {
    context
        .dummies
        .get(key)
        .await
        .map_err(ReconcilerError::StoreError)
}

async fn echo_spec(
    key: &ObjectKey,
    mut dummy: Versioned<Dummy>,
    context: &ReconcilerContext,
) -> Result<Step<Lifecycle<Dummy>>, ReconcilerError> {
    let message = &dummy.object().spec.message;
    if dummy.object().spec_echo() == Some(message.as_str()) {
        return Ok(Step::Continue(Lifecycle::of(Some(dummy))));
    }

    info!("Writing new message to '{key}' status.specEcho");
    let message = message.to_owned();
    dummy
        .object_mut()
        .status
        .get_or_insert_with(Default::default)
        .spec_echo = message;

    let outcome = context
        .dummies
        .update_status(&dummy)
        .await
        .map_err(ReconcilerError::StoreError)?;

    if let WriteOutcome::Conflict = outcome {
        info!("Dummy '{key}' was modified while echoing its spec, retrying");
        return Ok(Step::Finish(PassOutcome::Retry));
    }

    // the status write bumped the version, later writes need the current one
    Ok(Step::Continue(Lifecycle::of(fetch_dummy(key, context).await?)))
}

async fn ensure_finalizer(
    key: &ObjectKey,
    mut dummy: Versioned<Dummy>,
    context: &ReconcilerContext,
) -> Result<Step<Versioned<Dummy>>, ReconcilerError> {
    if !dummy.object_mut().add_finalizer(DUMMY_FINALIZER) {
        return Ok(Step::Continue(dummy));
    }

    info!("Adding finalizer to Dummy '{key}'");

    match context
        .dummies
        .update(&dummy)
        .await
        .map_err(ReconcilerError::StoreError)?
    {
        WriteOutcome::Applied(dummy) => Ok(Step::Continue(dummy)),
        WriteOutcome::Conflict => {
            info!("Dummy '{key}' was modified while adding the finalizer, retrying");
            Ok(Step::Finish(PassOutcome::Retry))
        }
    }
}

async fn finalize(
    key: &ObjectKey,
    mut dummy: Versioned<Dummy>,
    context: &ReconcilerContext,
) -> Result<PassOutcome, ReconcilerError> {
    if !dummy.object().has_finalizer(DUMMY_FINALIZER) {
        debug!("Dummy '{key}' is being deleted and holds no finalizer of ours");
        return Ok(PassOutcome::Done);
    }

    info!("Performing operations for Dummy '{key}' before delete");
    // the pod is owner-linked, the garbage collector removes it after the dummy is gone

    info!("Removing finalizer from Dummy '{key}'");
    dummy.object_mut().remove_finalizer(DUMMY_FINALIZER);

    match context
        .dummies
        .update(&dummy)
        .await
        .map_err(ReconcilerError::StoreError)?
    {
        WriteOutcome::Applied(_) => Ok(PassOutcome::Done),
        WriteOutcome::Conflict => {
            info!("Dummy '{key}' was modified while removing the finalizer, retrying");
            Ok(PassOutcome::Retry)
        }
    }
}

async fn sync_pod(
    key: &ObjectKey,
    dummy: Versioned<Dummy>,
    context: &ReconcilerContext,
) -> Result<PassOutcome, ReconcilerError> {
    let pod_key = dummy
        .object()
        .try_get_pod_key()
        .ok_or(ReconcilerError::MissingObjectMetadata)?;

    match context
        .pods
        .get(&pod_key)
        .await
        .map_err(ReconcilerError::StoreError)?
    {
        Some(pod) => sync_pod_status(key, dummy, pod.object(), context).await,
        None => create_pod(&pod_key, dummy.object(), context).await,
    }
}

async fn create_pod(
    pod_key: &ObjectKey,
    dummy: &Dummy,
    context: &ReconcilerContext,
) -> Result<PassOutcome, ReconcilerError> {
    let image = PodImage::resolve(&context.config).map_err(ReconcilerError::ConfigurationError)?;
    let pod = dummy
        .generate_pod(&image)
        .map_err(ReconcilerError::OwnershipLinkError)?;

    info!(
        "Creating pod '{pod_key}' with image '{}'",
        image.full_reference
    );

    match context
        .pods
        .create(&pod)
        .await
        .map_err(ReconcilerError::StoreError)?
    {
        CreateOutcome::Created => info!("Pod '{pod_key}' created"),
        CreateOutcome::AlreadyExists => info!("Pod '{pod_key}' already exists"),
    }

    // the pod's own events trigger the status sync
    Ok(PassOutcome::Done)
}

async fn sync_pod_status(
    key: &ObjectKey,
    mut dummy: Versioned<Dummy>,
    pod: &Pod,
    context: &ReconcilerContext,
) -> Result<PassOutcome, ReconcilerError> {
    let observed = pod
        .status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .map(PodPhase::from_phase);

    let phase = match observed {
        Some(phase) if dummy.object().pod_status() != Some(phase) => phase,
        _ => return Ok(PassOutcome::Done),
    };

    info!("Writing pod phase '{phase}' to '{key}' status.podStatus");
    dummy
        .object_mut()
        .status
        .get_or_insert_with(Default::default)
        .pod_status = Some(phase);

    match context
        .dummies
        .update_status(&dummy)
        .await
        .map_err(ReconcilerError::StoreError)?
    {
        WriteOutcome::Applied(_) => Ok(PassOutcome::Done),
        WriteOutcome::Conflict => {
            info!("Dummy '{key}' was modified while mirroring the pod phase, retrying");
            Ok(PassOutcome::Retry)
        }
    }
}
