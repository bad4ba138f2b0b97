use std::sync::{Arc, Mutex, OnceLock, RwLock};

use crate::listeners::{ListenerSet, Subscription};

/// Normalization applied to every snapshot before it is published.
pub(crate) type CommitHook<S> = Box<dyn Fn(&mut S) + Send + Sync>;

/// Observable container holding one immutable state snapshot.
///
/// `Store<S>` is cheap to clone; clones share the same snapshot, commit hook
/// and subscribers. Every write replaces the whole snapshot. Writers are
/// serialized, but the snapshot lock is only taken to swap the new snapshot
/// in, so reads never wait on an updater. Subscribers are called
/// synchronously, in registration order, once the write has finished.
///
/// # Example
///
/// ```
/// use listkit::store::Store;
///
/// let store = Store::new(1);
/// let _sub = store.subscribe(|value| println!("now {value}"));
/// store.update(|v| v + 1);
/// assert_eq!(*store.get(), 2);
/// ```
pub struct Store<S> {
    inner: Arc<RwLock<Arc<S>>>,
    writer: Arc<Mutex<()>>,
    commit: Arc<OnceLock<CommitHook<S>>>,
    listeners: ListenerSet<Arc<S>>,
}

impl<S: Send + Sync + 'static> Store<S> {
    /// Create a store with the given initial snapshot.
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
            writer: Arc::new(Mutex::new(())),
            commit: Arc::new(OnceLock::new()),
            listeners: ListenerSet::new(),
        }
    }

    /// Install the hook every published snapshot goes through. Returns
    /// `false` if one is already installed.
    pub(crate) fn set_commit_hook(&self, hook: CommitHook<S>) -> bool {
        self.commit.set(hook).is_ok()
    }

    /// Get the current snapshot.
    pub fn get(&self) -> Arc<S> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&*guard))
            .unwrap_or_else(|poisoned| Arc::clone(&*poisoned.into_inner()))
    }

    /// Replace the snapshot.
    pub fn replace(&self, next: S) {
        self.update(move |_| next);
    }

    /// Compute the next snapshot from the current one.
    ///
    /// The updater may read this store (it sees the current snapshot) but
    /// must not write to it: writers are serialized and the lock is not
    /// reentrant.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&S) -> S,
    {
        let next = {
            let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            let current = self.get();
            let mut next = f(&current);
            if let Some(hook) = self.commit.get() {
                hook(&mut next);
            }
            let next = Arc::new(next);
            *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Arc::clone(&next);
            next
        };
        self.listeners.notify(&next);
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            writer: Arc::clone(&self.writer),
            commit: Arc::clone(&self.commit),
            listeners: self.listeners.clone(),
        }
    }
}

impl<S: Default + Send + Sync + 'static> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_update_replaces_snapshot() {
        let store = Store::new(vec![1, 2]);
        let before = store.get();
        store.update(|v| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert_eq!(*before, vec![1, 2]);
        assert_eq!(*store.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = Store::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reader = store.clone();
        let seen2 = Arc::clone(&seen);
        let _sub = store.subscribe(move |_| seen2.lock().unwrap().push(*reader.get()));

        store.replace(5);
        store.update(|v| v * 2);
        assert_eq!(*seen.lock().unwrap(), vec![5, 10]);
    }

    #[test]
    fn test_updater_may_read_store() {
        let store = Store::new(1);
        let reader = store.clone();
        store.update(|v| v + *reader.get() * 10);
        assert_eq!(*store.get(), 11);
    }

    #[test]
    fn test_commit_hook_applies_to_every_clone() {
        let store = Store::new(vec![3, 1]);
        assert!(store.set_commit_hook(Box::new(|v: &mut Vec<i32>| v.sort())));
        assert!(!store.set_commit_hook(Box::new(|v: &mut Vec<i32>| v.clear())));

        let host = store.clone();
        host.replace(vec![9, 2, 5]);
        assert_eq!(*store.get(), vec![2, 5, 9]);
        host.update(|v| {
            let mut next = v.clone();
            next.push(0);
            next
        });
        assert_eq!(*store.get(), vec![0, 2, 5, 9]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = Store::new(0);
        let count = Arc::new(Mutex::new(0));
        let c = Arc::clone(&count);
        let sub = store.subscribe(move |_| *c.lock().unwrap() += 1);
        store.replace(1);
        sub.unsubscribe();
        store.replace(2);
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
