use kube::Resource;

use super::store::Versioned;

/// Where an object stands in the two-phase delete protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<K> {
    Active(Versioned<K>),
    /// deletion was requested, the store holds the object until its finalizers are cleared
    PendingDeletion(Versioned<K>),
    Gone,
}

impl<K: Resource> Lifecycle<K> {
    pub fn of(observed: Option<Versioned<K>>) -> Self {
        match observed {
            None => Lifecycle::Gone,
            Some(object) if object.object().meta().deletion_timestamp.is_some() => {
                Lifecycle::PendingDeletion(object)
            }
            Some(object) => Lifecycle::Active(object),
        }
    }
}
