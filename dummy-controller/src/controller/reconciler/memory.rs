use std::{
    collections::BTreeMap,
    marker::PhantomData,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use dummy_controller_core::kubernetes::store::{
    require_key, CreateOutcome, ObjectKey, ObjectStore, StoreError, Versioned, WriteOutcome,
};
use kube::{
    core::ErrorResponse,
    Resource,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

/// In-memory [`ObjectStore`] mimicking the API server's optimistic
/// concurrency: every write must carry the current resource version, status
/// and main object are written separately, and an object pending deletion
/// disappears once its last finalizer is removed.
pub struct MemoryStore<K> {
    state: Arc<Mutex<MemoryState>>,
    resource: PhantomData<fn() -> K>,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<ObjectKey, Value>,
    last_version: u64,
    writes: usize,
    pending_conflicts: usize,
    pending_failure: Option<u16>,
    pending_create_races: usize,
}

impl<K> Clone for MemoryStore<K> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            resource: PhantomData,
        }
    }
}

impl<K> Default for MemoryStore<K> {
    fn default() -> Self {
        Self {
            state: Default::default(),
            resource: PhantomData,
        }
    }
}

impl MemoryState {
    fn next_version(&mut self) -> String {
        self.last_version += 1;
        self.last_version.to_string()
    }

    fn take_failure(&mut self) -> Result<(), StoreError> {
        match self.pending_failure.take() {
            Some(code) => Err(api_error(code, "Injected")),
            None => Ok(()),
        }
    }

    fn check_version(&mut self, key: &ObjectKey, version: &str) -> Result<bool, StoreError> {
        if self.pending_conflicts > 0 {
            self.pending_conflicts -= 1;
            return Ok(false);
        }

        let current = self
            .objects
            .get(key)
            .ok_or_else(|| api_error(404, "NotFound"))?;

        Ok(current["metadata"]["resourceVersion"] == json!(version))
    }

    fn commit(&mut self, key: &ObjectKey, mut value: Value) -> Value {
        value["metadata"]["resourceVersion"] = json!(self.next_version());
        self.writes += 1;

        let metadata = &value["metadata"];
        let deleting = !metadata["deletionTimestamp"].is_null();
        let finalized = metadata["finalizers"]
            .as_array()
            .map_or(true, |finalizers| finalizers.is_empty());

        if deleting && finalized {
            self.objects.remove(key);
        } else {
            self.objects.insert(key.clone(), value.clone());
        }

        value
    }
}

impl<K> MemoryStore<K>
where
    K: Resource + Clone + Serialize + DeserializeOwned,
{
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    /// Seeds an object as if a user created it. Doesn't count as a write.
    pub fn insert(&self, mut object: K) {
        let key = ObjectKey::of(&object).unwrap();
        let mut state = self.state();

        let meta = object.meta_mut();
        meta.uid.get_or_insert_with(|| format!("uid-{}", key.name));
        meta.resource_version = Some(state.next_version());

        state
            .objects
            .insert(key, serde_json::to_value(object).unwrap());
    }

    /// Changes an object behind the controller's back
    pub fn modify(&self, key: &ObjectKey, change: impl FnOnce(&mut K)) {
        let mut object = self.object(key).unwrap();
        change(&mut object);

        let mut state = self.state();
        object.meta_mut().resource_version = Some(state.next_version());
        state
            .objects
            .insert(key.clone(), serde_json::to_value(object).unwrap());
    }

    pub fn object(&self, key: &ObjectKey) -> Option<K> {
        self.state()
            .objects
            .get(key)
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// Number of successful mutations
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    pub fn conflict_next_write(&self) {
        self.state().pending_conflicts += 1;
    }

    /// Next create finds the object already created by someone else
    pub fn race_next_create(&self) {
        self.state().pending_create_races += 1;
    }

    pub fn fail_next_request(&self, code: u16) {
        self.state().pending_failure = Some(code);
    }
}

fn api_error(code: u16, reason: &str) -> StoreError {
    StoreError::Api(kube::Error::Api(ErrorResponse {
        status: "Failure".to_owned(),
        message: format!("memory store: {reason}"),
        reason: reason.to_owned(),
        code,
    }))
}

fn to_value<K: Serialize>(object: &K) -> Result<Value, StoreError> {
    serde_json::to_value(object)
        .map_err(|err| StoreError::Serialization("object".to_owned(), err))
}

fn from_value<K: Resource + Clone + DeserializeOwned>(
    value: Value,
) -> Result<Versioned<K>, StoreError> {
    let object = serde_json::from_value(value)
        .map_err(|err| StoreError::Serialization("object".to_owned(), err))?;

    Versioned::observe(object)
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore<K>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<Option<Versioned<K>>, StoreError> {
        let mut state = self.state();
        state.take_failure()?;

        state.objects.get(key).cloned().map(from_value).transpose()
    }

    async fn update(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError> {
        let key = require_key(object.object())?;
        let mut state = self.state();
        state.take_failure()?;

        if !state.check_version(&key, object.version())? {
            return Ok(WriteOutcome::Conflict);
        }

        let mut value = to_value(&object.stamped())?;
        value["status"] = state.objects[&key]["status"].clone();

        Ok(WriteOutcome::Applied(from_value(state.commit(&key, value))?))
    }

    async fn update_status(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError> {
        let key = require_key(object.object())?;
        let mut state = self.state();
        state.take_failure()?;

        if !state.check_version(&key, object.version())? {
            return Ok(WriteOutcome::Conflict);
        }

        let mut value = state.objects[&key].clone();
        value["status"] = to_value(&object.stamped())?["status"].clone();

        Ok(WriteOutcome::Applied(from_value(state.commit(&key, value))?))
    }

    async fn create(&self, object: &K) -> Result<CreateOutcome, StoreError> {
        let key = require_key(object)?;
        let mut state = self.state();
        state.take_failure()?;

        if state.pending_create_races > 0 {
            state.pending_create_races -= 1;
            return Ok(CreateOutcome::AlreadyExists);
        }

        if state.objects.contains_key(&key) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let mut value = to_value(object)?;
        value["metadata"]["uid"] = json!(format!("uid-{}", key.name));
        state.commit(&key, value);

        Ok(CreateOutcome::Created)
    }
}
