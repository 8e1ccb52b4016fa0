//! A typed event channel with per-connection execution policy.
//!
//! Each [`Dispatcher<T>`] is owned by its event source (the listener owns
//! one per event kind) rather than living in a global registry, matching
//! the "no global signal registry" redesign.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// How a connected handler is invoked when the dispatcher emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Runs inline on the emitting task, in connection order.
    Sync,
    /// Posted to the ambient `tokio` runtime via `tokio::spawn`; emission
    /// does not wait for it to run.
    Async,
}

/// A handle returned by [`Dispatcher::connect`]; pass it to
/// [`Dispatcher::disconnect`] to remove the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection(u64);

struct Slot<T> {
    id: u64,
    policy: Policy,
    handler: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            id: self.id,
            policy: self.policy,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Handlers receive an owned clone of the emitted value rather than a
/// borrow: an `Async` handler may run after `emit` returns, so it cannot
/// hold a reference into the emitting task's stack. Event types here are
/// cheap, `Clone` value types, so this costs little and keeps both
/// policies under one call signature.
pub struct Dispatcher<T> {
    next_id: AtomicU64,
    slots: Mutex<Vec<Slot<T>>>,
}

impl<T> Default for Dispatcher<T> {
    fn default() -> Self {
        Dispatcher {
            next_id: AtomicU64::new(1),
            slots: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Dispatcher<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `policy`. Returns a handle for
    /// [`Self::disconnect`].
    pub fn connect<F>(&self, policy: Policy, handler: F) -> Connection
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().unwrap().push(Slot {
            id,
            policy,
            handler: Arc::new(handler),
        });
        Connection(id)
    }

    /// Idempotent: disconnecting an already-disconnected handle is a no-op.
    pub fn disconnect(&self, connection: Connection) {
        self.slots.lock().unwrap().retain(|slot| slot.id != connection.0);
    }

    /// Invoke every currently-connected handler exactly once, in
    /// connection order. A handler that calls `disconnect` on its own
    /// connection during emission does not affect this or any later
    /// handler in the same emission, since the slot list is snapshotted
    /// up front.
    ///
    /// A `Sync` handler that panics is caught at its call site and logged;
    /// it does not unwind past `emit`, so every handler still to come in
    /// this emission still runs.
    pub fn emit(&self, value: T) {
        let snapshot: Vec<Slot<T>> = self.slots.lock().unwrap().clone();
        for slot in snapshot {
            match slot.policy {
                Policy::Sync => {
                    let handler = &slot.handler;
                    let value = value.clone();
                    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        (handler)(value)
                    }));
                    if let Err(payload) = outcome {
                        let message = payload
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| payload.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "non-string panic payload".to_string());
                        log::error!("dispatcher handler (connection {}) panicked: {message}", slot.id);
                    }
                }
                Policy::Async => {
                    let handler = Arc::clone(&slot.handler);
                    let value = value.clone();
                    tokio::spawn(async move {
                        (handler)(value);
                    });
                }
            }
        }
    }
}
