use std::any::type_name;

use kube::Resource;

pub fn pretty_type_name<'a, T>() -> &'a str {
    let name = type_name::<T>();

    name.rsplit("::").next().unwrap_or(name)
}

pub trait HasFinalizer {
    fn has_finalizer(&self, finalizer: &str) -> bool;
    /// Returns `false` if the finalizer was already present
    fn add_finalizer(&mut self, finalizer: &str) -> bool;
    /// Returns `false` if there was nothing to remove
    fn remove_finalizer(&mut self, finalizer: &str) -> bool;
}

impl<T: Resource> HasFinalizer for T {
    fn has_finalizer(&self, finalizer: &str) -> bool {
        self.meta()
            .finalizers
            .as_ref()
            .map(|finalizers| finalizers.iter().any(|f| f == finalizer))
            .unwrap_or(false)
    }

    fn add_finalizer(&mut self, finalizer: &str) -> bool {
        if self.has_finalizer(finalizer) {
            return false;
        }

        self.meta_mut()
            .finalizers
            .get_or_insert_with(Vec::new)
            .push(finalizer.to_owned());

        true
    }

    fn remove_finalizer(&mut self, finalizer: &str) -> bool {
        let Some(finalizers) = self.meta_mut().finalizers.as_mut() else {
            return false;
        };

        let count = finalizers.len();
        finalizers.retain(|f| f != finalizer);

        count != finalizers.len()
    }
}
