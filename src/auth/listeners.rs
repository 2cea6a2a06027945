//! Signed-in change notifications

use std::sync::{Arc, Mutex, PoisonError, Weak};

use log::trace;

/// Handler invoked with the new signed-in flag
pub type SignedInHandler = Box<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    handlers: Vec<(u64, Arc<dyn Fn(bool) + Send + Sync>)>,
}

/// Registry of signed-in change handlers
///
/// Handlers run synchronously on the notifying task, outside the registry lock.
#[derive(Clone, Default)]
pub struct SignedInListeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl SignedInListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it stays registered until the subscription is dropped
    pub fn subscribe(&self, handler: SignedInHandler) -> Subscription {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.handlers.push((id, Arc::from(handler)));
        trace!("Registered signed-in listener {}", id);

        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Call every registered handler with `signed_in`
    pub fn notify(&self, signed_in: bool) {
        let handlers: Vec<_> = {
            let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.handlers.iter().map(|(_, h)| h.clone()).collect()
        };
        trace!("Notifying {} listener(s): signed_in={}", handlers.len(), signed_in);
        for handler in handlers {
            handler(signed_in);
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`SignedInListeners::subscribe`]
///
/// The handler stays registered for as long as the handle is alive.
#[derive(Debug)]
#[must_use = "dropping the subscription unregisters the handler"]
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    /// Remove the handler from its registry
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        // The handler is dropped after the lock is released.
        let removed = {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            let index = table.handlers.iter().position(|(id, _)| *id == self.id);
            index.map(|index| table.handlers.remove(index))
        };
        if removed.is_some() {
            trace!("Removed signed-in listener {}", self.id);
        }
    }
}
