//! A lock-guarded handle for sharing a [`Mapping`] between threads.
//!
//! The mapping itself has no interior synchronization. `SharedMapping`
//! puts one exclusive lock around a whole instance, so every operation seen
//! through it is atomic with respect to the other handles.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::Mapping;

/// A cloneable, thread-safe handle to a [`Mapping`].
///
/// Clones share the same underlying mapping.
///
/// # Examples
///
/// ```rust
/// use mapping::SharedMapping;
/// use std::thread;
///
/// let shared: SharedMapping<i32, i32> = SharedMapping::new();
/// let handles: Vec<_> = (0..4)
///     .map(|worker| {
///         let shared = shared.clone();
///         thread::spawn(move || shared.with(|map| map.set(worker, worker * worker)))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(shared.with(|map| map.len()), 4);
/// ```
pub struct SharedMapping<K, V> {
    inner: Arc<Mutex<Mapping<K, V>>>,
}

impl<K, V> SharedMapping<K, V> {
    /// Creates a handle to a new empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::from(Mapping::new())
    }

    /// Runs `function` with exclusive access to the mapping.
    ///
    /// The lock is held for the duration of the call only.
    pub fn with<R, F>(&self, function: F) -> R
    where
        F: FnOnce(&mut Mapping<K, V>) -> R,
    {
        let mut guard = self.inner.lock();
        function(&mut guard)
    }

    /// Acquires the lock, blocking until it is available.
    pub fn lock(&self) -> MutexGuard<'_, Mapping<K, V>> {
        self.inner.lock()
    }

    /// Returns the mapping if this is the last handle to it.
    ///
    /// # Errors
    ///
    /// Returns the handle unchanged while other clones are alive.
    pub fn try_into_inner(self) -> Result<Mapping<K, V>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<K: Clone, V: Clone> SharedMapping<K, V> {
    /// Returns a copy of the mapping as it is right now.
    #[must_use]
    pub fn snapshot(&self) -> Mapping<K, V> {
        self.inner.lock().clone()
    }
}

impl<K, V> Clone for SharedMapping<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SharedMapping<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<Mapping<K, V>> for SharedMapping<K, V> {
    fn from(mapping: Mapping<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mapping)),
        }
    }
}

static_assertions::assert_impl_all!(SharedMapping<String, i32>: Send, Sync, Clone);
