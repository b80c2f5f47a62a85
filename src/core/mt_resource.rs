use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted value behind a read-write lock.
///
/// Chunks and the world are shared between the owning thread and the worker
/// pool through this type. Readers run concurrently; a writer excludes everyone,
/// which is what serialises block edits against meshing of the same chunk.
///
/// # Examples
///
/// ```
/// use voxel_terrain::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let handle = counter.clone();
///
/// std::thread::spawn(move || *handle.get_mut() += 1)
///     .join()
///     .unwrap();
///
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource` for sharing.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Acquires shared read access.
    ///
    /// # Panics
    /// Panics if a writer panicked while holding the lock.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Acquires exclusive write access.
    ///
    /// # Panics
    /// Panics if another holder panicked while holding the lock.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }

    /// Whether both handles point at the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Send + Sync + std::fmt::Debug> std::fmt::Debug for MtResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MtResource").field(&*self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_value() {
        let a = MtResource::new(vec![1, 2]);
        let b = a.clone();
        b.get_mut().push(3);
        assert_eq!(*a.get(), vec![1, 2, 3]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&MtResource::new(vec![1, 2, 3])));
    }

    #[test]
    fn writers_on_many_threads_are_serialised() {
        let total = MtResource::new(0u32);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let total = total.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        *total.get_mut() += 1;
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*total.get(), 8000);
    }
}
