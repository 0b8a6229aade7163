//! Ordered, synchronous listener registry.
//!
//! Listeners run on the publishing thread, in subscription order. A listener
//! must not subscribe to or publish on the registry that is calling it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Observers<T> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    // Held across a whole publish so deliveries for separate events never interleave
    publish: Mutex<()>,
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
            publish: Mutex::new(()),
        })
    }

    /// Register `listener`, handing it `current()` before any later event.
    pub fn subscribe<F>(self: &Arc<Self>, current: impl FnOnce() -> T, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let _publishing = lock(&self.publish);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener<T> = Arc::new(listener);
        lock(&self.listeners).push((id, Arc::clone(&listener)));
        listener(&current());

        let registry: Arc<dyn Unsubscribe> = Arc::clone(self) as Arc<dyn Unsubscribe>;
        Subscription {
            registry: Arc::downgrade(&registry),
            id,
        }
    }

    /// Run `update` and deliver whatever it returns to every listener.
    /// Nothing is delivered when `update` returns `None`.
    pub fn publish_with<R>(&self, update: impl FnOnce() -> Option<(T, R)>) -> Option<R> {
        let _publishing = lock(&self.publish);
        let (event, result) = update()?;
        let listeners: Vec<Listener<T>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&event);
        }
        Some(result)
    }

    pub fn len(&self) -> usize {
        lock(&self.listeners).len()
    }
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<T: 'static> Unsubscribe for Observers<T> {
    fn unsubscribe(&self, id: u64) {
        lock(&self.listeners).retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Handle returned by `subscribe`; dropping it removes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<dyn Unsubscribe>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}
