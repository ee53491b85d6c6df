//! # Reactive Store Primitive
//!
//! A single mutable state container with explicit publish/subscribe: one
//! writer context, arbitrarily many readers. Notification is synchronous and
//! total, so a subscriber always observes a fully updated value, never a
//! partial intermediate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: RwLock<T>,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
}

/// Shared handle to one piece of observable state. Cloning the handle clones
/// the reference, not the value.
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(initial),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.inner.value.read().expect("store lock poisoned").clone()
    }

    /// Replace the value and notify every subscriber.
    pub fn set(&self, value: T) {
        {
            let mut slot = self.inner.value.write().expect("store lock poisoned");
            *slot = value;
        }
        self.notify();
    }

    /// Mutate the value in place and notify every subscriber.
    pub fn update<F: FnOnce(&mut T)>(&self, mutate: F) {
        {
            let mut slot = self.inner.value.write().expect("store lock poisoned");
            mutate(&mut *slot);
        }
        self.notify();
    }

    /// Register a listener called after every mutation. Dropping the returned
    /// [`Subscription`] unsubscribes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .expect("store lock poisoned")
            .push((id, Arc::new(listener)));

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .listeners
                        .lock()
                        .expect("store lock poisoned")
                        .retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    fn notify(&self) {
        // Snapshot value and listener list first, then invoke without holding
        // either lock: a listener is allowed to read this store or write
        // another one.
        let snapshot = self.get();
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .expect("store lock poisoned")
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

/// Handle for an active subscription; dropping it detaches the listener.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Keep the listener attached for the life of the store.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn set_notifies_with_fresh_value() {
        let store = Store::new(1_u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |v| sink.lock().unwrap().push(*v));

        store.set(2);
        store.update(|v| *v += 3);

        assert_eq!(*seen.lock().unwrap(), vec![2, 5]);
        assert_eq!(store.get(), 5);
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let store = Store::new(0_u32);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.set(1);
        drop(sub);
        store.set(2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_write_a_downstream_store() {
        let upstream = Store::new(1_u32);
        let downstream = Store::new(0_u32);
        let target = downstream.clone();
        let _sub = upstream.subscribe(move |v| target.set(v * 10));

        upstream.set(4);
        assert_eq!(downstream.get(), 40);
    }
}
