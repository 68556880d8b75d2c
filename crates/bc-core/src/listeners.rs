//! Callback registry with drop-based unsubscription
//!
//! Listeners are invoked outside the registry lock, so a callback may
//! register or drop other listeners while it runs.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

/// A set of callbacks notified with a borrowed event
pub struct Listeners<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Register a callback; it stays registered until the guard is dropped
    pub fn register<F>(&self, callback: F) -> ListenerGuard
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.callbacks.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        ListenerGuard {
            remove: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.lock().callbacks.retain(|(cid, _)| *cid != id);
                }
            })),
        }
    }

    /// Invoke every registered callback in registration order
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self
            .registry
            .lock()
            .callbacks
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unregisters its callback when dropped
#[must_use = "dropping the guard unregisters the listener immediately"]
pub struct ListenerGuard {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerGuard {
    /// Keep the listener registered for the lifetime of the registry
    pub fn detach(mut self) {
        self.remove.take();
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("attached", &self.remove.is_some())
            .finish()
    }
}
