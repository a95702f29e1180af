use std::{fmt::Debug, marker::PhantomData};

use async_trait::async_trait;
use k8s_openapi::{
    serde::{de::DeserializeOwned, Serialize},
    NamespaceResourceScope,
};
use kube::{api::PostParams, Api, Client, Resource};
use log::debug;
use thiserror::Error;

use crate::helpers::pretty_type_name;

/// Namespace and name of a namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn of<K: Resource>(object: &K) -> Option<Self> {
        let meta = object.meta();

        Some(Self::new(meta.namespace.as_deref()?, meta.name.as_deref()?))
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// An object together with the resource version it was read at.
///
/// Writes go out with `version` stamped on them, so the store rejects them
/// if anyone else wrote the object in between.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<K> {
    object: K,
    version: String,
}

impl<K> Versioned<K> {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn object(&self) -> &K {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut K {
        &mut self.object
    }
}

impl<K: Resource + Clone> Versioned<K> {
    pub fn observe(object: K) -> Result<Self, StoreError> {
        let version = object
            .meta()
            .resource_version
            .clone()
            .ok_or_else(|| StoreError::MissingVersion(pretty_type_name::<K>().to_owned()))?;

        Ok(Self { object, version })
    }

    /// Copy of the object carrying the version it was read at, ready to be sent
    pub fn stamped(&self) -> K {
        let mut object = self.object.clone();
        object.meta_mut().resource_version = Some(self.version.clone());

        object
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<K> {
    Applied(Versioned<K>),
    /// the object changed since it was read
    Conflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed! Reason: {}", .0)]
    Api(kube::Error),
    #[error("{} was returned without a resource version!", .0)]
    MissingVersion(String),
    #[error("{} is missing a name or namespace!", .0)]
    MissingKey(String),
    #[error("Couldn't serialize the {}! Reason: {}", .0, .1)]
    Serialization(String, serde_json::Error),
}

#[async_trait]
pub trait ObjectStore<K>: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Option<Versioned<K>>, StoreError>;
    /// Replaces everything except the status
    async fn update(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError>;
    /// Replaces only the status
    async fn update_status(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError>;
    async fn create(&self, object: &K) -> Result<CreateOutcome, StoreError>;
}

/// [`ObjectStore`] backed by the kubernetes API server.
pub struct KubeStore<K> {
    client: Client,
    field_manager: String,
    resource: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    pub fn new(client: Client, field_manager: &str) -> Self {
        Self {
            client,
            field_manager: field_manager.to_owned(),
            resource: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Debug,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            dry_run: false,
            field_manager: Some(self.field_manager.clone()),
        }
    }
}

/// Key an object is stored under, required before it can be written
pub fn require_key<K: Resource>(object: &K) -> Result<ObjectKey, StoreError> {
    ObjectKey::of(object)
        .ok_or_else(|| StoreError::MissingKey(pretty_type_name::<K>().to_owned()))
}

fn is_conflict(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 409)
}

fn into_write_outcome<K: Resource + Clone>(
    result: Result<K, kube::Error>,
) -> Result<WriteOutcome<K>, StoreError> {
    match result {
        Ok(object) => Ok(WriteOutcome::Applied(Versioned::observe(object)?)),
        Err(error) if is_conflict(&error) => Ok(WriteOutcome::Conflict),
        Err(error) => Err(StoreError::Api(error)),
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<Option<Versioned<K>>, StoreError> {
        debug!("Fetching {} '{key}'...", pretty_type_name::<K>());

        self.api(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(StoreError::Api)?
            .map(Versioned::observe)
            .transpose()
    }

    async fn update(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError> {
        let key = require_key(object.object())?;
        debug!(
            "Replacing {} '{key}' at version {}...",
            pretty_type_name::<K>(),
            object.version()
        );

        let result = self
            .api(&key.namespace)
            .replace(&key.name, &self.post_params(), &object.stamped())
            .await;

        into_write_outcome(result)
    }

    async fn update_status(&self, object: &Versioned<K>) -> Result<WriteOutcome<K>, StoreError> {
        let key = require_key(object.object())?;
        debug!(
            "Replacing {} '{key}' status at version {}...",
            pretty_type_name::<K>(),
            object.version()
        );

        let data = serde_json::to_vec(&object.stamped()).map_err(|err| {
            StoreError::Serialization(pretty_type_name::<K>().to_owned(), err)
        })?;
        let result = self
            .api(&key.namespace)
            .replace_status(&key.name, &self.post_params(), data)
            .await;

        into_write_outcome(result)
    }

    async fn create(&self, object: &K) -> Result<CreateOutcome, StoreError> {
        let key = require_key(object)?;
        debug!("Creating {} '{key}'...", pretty_type_name::<K>());

        match self.api(&key.namespace).create(&self.post_params(), object).await {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(error) if is_conflict(&error) => Ok(CreateOutcome::AlreadyExists),
            Err(error) => Err(StoreError::Api(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::Pod;
    use kube::core::{ErrorResponse, ObjectMeta};

    use super::{into_write_outcome, require_key, ObjectKey, StoreError, Versioned, WriteOutcome};

    fn pod(version: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("hello-pod".to_owned()),
                namespace: Some("default".to_owned()),
                resource_version: version.map(str::to_owned),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_owned(),
            message: "test".to_owned(),
            reason: "Test".to_owned(),
            code,
        })
    }

    #[test]
    fn observing_requires_a_resource_version() {
        assert!(matches!(
            Versioned::observe(pod(None)),
            Err(StoreError::MissingVersion(_))
        ));
        assert_eq!(Versioned::observe(pod(Some("7"))).unwrap().version(), "7");
    }

    #[test]
    fn stamped_copy_carries_the_observed_version() {
        let mut versioned = Versioned::observe(pod(Some("7"))).unwrap();
        versioned.object_mut().metadata.resource_version = Some("99".to_owned());

        assert_eq!(
            versioned.stamped().metadata.resource_version.as_deref(),
            Some("7")
        );
    }

    #[test]
    fn conflicts_are_outcomes_not_errors() {
        assert_eq!(
            into_write_outcome::<Pod>(Err(api_error(409))).unwrap(),
            WriteOutcome::Conflict
        );
        assert!(into_write_outcome::<Pod>(Err(api_error(500))).is_err());
        assert!(matches!(
            into_write_outcome(Ok(pod(Some("8")))).unwrap(),
            WriteOutcome::Applied(applied) if applied.version() == "8"
        ));
    }

    #[test]
    fn object_key_requires_name_and_namespace() {
        assert_eq!(
            ObjectKey::of(&pod(None)),
            Some(ObjectKey::new("default", "hello-pod"))
        );
        assert_eq!(ObjectKey::of(&Pod::default()), None);
        assert_eq!(ObjectKey::new("ns", "name").to_string(), "ns/name");
    }

    #[test]
    fn writing_requires_a_complete_key() {
        assert!(matches!(
            require_key(&Pod::default()),
            Err(StoreError::MissingKey(kind)) if kind == "Pod"
        ));
        assert_eq!(
            require_key(&pod(None)).unwrap(),
            ObjectKey::new("default", "hello-pod")
        );
    }
}
