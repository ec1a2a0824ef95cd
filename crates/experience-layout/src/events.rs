//! Observer registration used to carry interaction events upward.
//!
//! Each layout unit owns an [`EventEmitter`] for its own event type. Parents
//! subscribe to their children when they are built and republish relabeled
//! events on their own emitter. Delivery is synchronous: `emit` calls every
//! handler registered at that moment and returns. Nothing is buffered, so an
//! event fired with no subscribers is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use experience_core::{Action, Id};
use parking_lot::{Mutex, MutexGuard};

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    handlers: Vec<(u64, Handler<E>)>,
}

/// A broadcast point for events of type `E`.
pub struct EventEmitter<E> {
    registry: Arc<Mutex<Registry<E>>>,
    next_id: Arc<AtomicU64>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry { handlers: Vec::new() })),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register a handler. It stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: Handler<E> = Arc::new(handler);
        self.lock().handlers.push((id, handler));

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry
                        .lock()
                        .handlers
                        .retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    /// Deliver `event` to every current subscriber, returning how many
    /// handlers saw it.
    ///
    /// Handlers run outside the registry lock, so a handler may subscribe or
    /// unsubscribe without deadlocking.
    pub fn emit(&self, event: &E) -> usize {
        let handlers: Vec<Handler<E>> = self
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry<E>> {
        self.registry.lock()
    }
}

/// Handle to a registered handler. Dropping it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unregister now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Keep the handler registered for as long as the emitter lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Where a click asks the host to go.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigateTo {
    OpenUrl { url: String },
    GoToScreen { screen_id: Id },
}

impl From<&Action> for NavigateTo {
    fn from(action: &Action) -> Self {
        match action {
            Action::OpenUrl { url } => NavigateTo::OpenUrl { url: url.clone() },
            Action::GoToScreen { screen_id, .. } => NavigateTo::GoToScreen {
                screen_id: screen_id.clone(),
            },
        }
    }
}
