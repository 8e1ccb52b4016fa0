//! Serializes the open/close transition of a [`DatagramEndpoint`] without
//! serializing the I/O itself.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::endpoint::DatagramEndpoint;
use crate::error::NlError;
use rtaco_wire::flags::GroupMask;

/// Owns an `E` and makes sure exactly one `open()` call ever does the
/// socket/bind work, even if several callers race to use the channel for
/// the first time.
///
/// The mutex here guards only the open/close transition; once open, every
/// caller holds its own `Arc` clone and calls `send`/`recv` concurrently
/// with no further locking (spec.md 4.4).
pub struct SocketGuard<E: DatagramEndpoint> {
    endpoint: Arc<E>,
    open_lock: Mutex<()>,
    protocol: i32,
    groups: GroupMask,
}

impl<E: DatagramEndpoint> SocketGuard<E> {
    pub fn new(endpoint: E, protocol: i32, groups: GroupMask) -> Self {
        SocketGuard {
            endpoint: Arc::new(endpoint),
            open_lock: Mutex::new(()),
            protocol,
            groups,
        }
    }

    /// Open the endpoint if it is not already open. Safe to call from many
    /// tasks at once: only the first caller through the lock pays for the
    /// `open()` syscalls, everyone else observes `is_open()` and returns.
    pub async fn ensure_open(&self) -> Result<(), NlError> {
        if self.endpoint.is_open() {
            return Ok(());
        }
        let _permit = self.open_lock.lock().await;
        if self.endpoint.is_open() {
            return Ok(());
        }
        self.endpoint.open(self.protocol, self.groups).await
    }

    /// A cloned handle to the endpoint, for concurrent send/recv use.
    pub fn socket(&self) -> Arc<E> {
        Arc::clone(&self.endpoint)
    }

    /// Abort any outstanding operation and tear down the socket. Calling
    /// `ensure_open` afterwards reopens it.
    pub async fn stop(&self) {
        self.endpoint.cancel();
        let _permit = self.open_lock.lock().await;
        self.endpoint.close().await;
    }
}
