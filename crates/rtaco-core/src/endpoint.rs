//! The datagram endpoint: owns the kernel-channel file descriptor.
//!
//! [`DatagramEndpoint`] is the "generic executor interface" the request
//! engine and the listener are written against — tests substitute
//! [`FakeEndpoint`] for a real kernel socket, and the rest of this crate
//! never names [`NetlinkEndpoint`] directly.

use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use socket2::{Domain, Socket, Type};
use tokio::io::unix::AsyncFd;
use tokio::sync::{Notify, RwLock};

use crate::error::NlError;
use rtaco_wire::flags::GroupMask;

/// Minimum receive buffer a caller should allocate, per spec: 32 KiB for
/// the listener's continuous read loop, 64 KiB for request tasks that may
/// receive a single large dump page.
pub const LISTENER_BUFFER_SIZE: usize = 32 * 1024;
pub const REQUEST_BUFFER_SIZE: usize = 64 * 1024;

/// A single kernel-channel datagram endpoint: open/bind once, then
/// send/receive until cancelled or closed.
///
/// All methods take `&self` so an endpoint can be shared behind an `Arc`
/// and driven concurrently by many tasks; implementations use interior
/// mutability for the open/close transition.
#[async_trait]
pub trait DatagramEndpoint: Send + Sync {
    /// Open a raw datagram socket in the kernel-route family, apply the
    /// socket options spec.md 4.3/6 calls for, and bind with `groups` and
    /// port-id 0 (kernel-assigned). Idempotent: a no-op if already open.
    async fn open(&self, protocol: i32, groups: GroupMask) -> Result<(), NlError>;

    /// Whether [`Self::open`] has succeeded and [`Self::close`] has not
    /// since been called.
    fn is_open(&self) -> bool;

    /// Send a full datagram. Partial sends are re-driven by the caller
    /// (the request engine), not by this method.
    async fn send(&self, buf: &[u8]) -> Result<usize, NlError>;

    /// Receive a single datagram into `buf`.
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NlError>;

    /// Abort any outstanding `send`/`recv` with [`NlError::Aborted`].
    /// Idempotent.
    fn cancel(&self);

    /// Close the underlying file descriptor. Idempotent.
    async fn close(&self);
}

/// Real [`DatagramEndpoint`] backed by an `AF_NETLINK` `SOCK_RAW` socket.
pub struct NetlinkEndpoint {
    inner: RwLock<Option<AsyncFd<Socket>>>,
    cancel_notify: Notify,
}

impl NetlinkEndpoint {
    pub fn new() -> Self {
        NetlinkEndpoint {
            inner: RwLock::new(None),
            cancel_notify: Notify::new(),
        }
    }
}

impl Default for NetlinkEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatagramEndpoint for NetlinkEndpoint {
    async fn open(&self, protocol: i32, groups: GroupMask) -> Result<(), NlError> {
        if self.is_open() {
            return Ok(());
        }

        let mut slot = self.inner.write().await;
        if slot.is_some() {
            return Ok(());
        }

        let socket = Socket::new(Domain::from(libc::AF_NETLINK), Type::RAW, Some(protocol.into()))?;
        socket.set_nonblocking(true)?;

        // Best-effort options; only bind failure is fatal (spec.md 4.3).
        if let Err(error) = socket.set_recv_buffer_size(64 * 1024) {
            log::debug!("failed to set receive buffer size: {error}");
        }
        if let Err(error) = set_netlink_sockopt(socket.as_raw_fd(), libc::NETLINK_NO_ENOBUFS, 1) {
            log::debug!("failed to disable drop-on-overrun: {error}");
        }
        if let Err(error) = set_netlink_sockopt(socket.as_raw_fd(), libc::NETLINK_EXT_ACK, 1) {
            log::debug!("failed to enable extended acknowledgements: {error}");
        }
        if let Err(error) = set_netlink_sockopt(socket.as_raw_fd(), libc::NETLINK_GET_STRICT_CHK, 1) {
            log::debug!("failed to enable strict-get-check: {error}");
        }

        let mut addr: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as u16;
        addr.nl_pid = 0;
        addr.nl_groups = groups.bits();

        let bind_result = unsafe {
            libc::bind(
                socket.as_raw_fd(),
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_nl>() as u32,
            )
        };
        if bind_result != 0 {
            return Err(NlError::Io(std::io::Error::last_os_error()));
        }

        *slot = Some(AsyncFd::new(socket)?);
        Ok(())
    }

    fn is_open(&self) -> bool {
        match self.inner.try_read() {
            Ok(slot) => slot.is_some(),
            Err(_) => false,
        }
    }

    async fn send(&self, buf: &[u8]) -> Result<usize, NlError> {
        let slot = self.inner.read().await;
        let async_fd = slot
            .as_ref()
            .ok_or_else(|| NlError::Io(std::io::Error::from(std::io::ErrorKind::NotConnected)))?;

        loop {
            let notified = self.cancel_notify.notified();
            tokio::pin!(notified);

            let mut guard = tokio::select! {
                guard = async_fd.writable() => guard?,
                _ = &mut notified => return Err(NlError::Aborted),
            };

            match guard.try_io(|fd| {
                let socket = fd.get_ref();
                let res = unsafe {
                    libc::send(
                        socket.as_raw_fd(),
                        buf.as_ptr() as *const libc::c_void,
                        buf.len(),
                        0,
                    )
                };
                if res < 0 {
                    Err(std::io::Error::last_os_error())
                } else {
                    Ok(res as usize)
                }
            }) {
                Ok(result) => return Ok(result?),
                Err(_would_block) => continue,
            }
        }
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NlError> {
        let slot = self.inner.read().await;
        let async_fd = slot
            .as_ref()
            .ok_or_else(|| NlError::Io(std::io::Error::from(std::io::ErrorKind::NotConnected)))?;

        loop {
            let notified = self.cancel_notify.notified();
            tokio::pin!(notified);

            let mut guard = tokio::select! {
                guard = async_fd.readable() => guard?,
                _ = &mut notified => return Err(NlError::Aborted),
            };

            let result = guard.try_io(|fd| {
                let socket = fd.get_ref();
                let res = unsafe {
                    libc::recv(
                        socket.as_raw_fd(),
                        buf.as_mut_ptr() as *mut libc::c_void,
                        buf.len(),
                        0,
                    )
                };
                if res < 0 {
                    Err(std::io::Error::last_os_error())
                } else {
                    Ok(res as usize)
                }
            });

            match result {
                Ok(result) => return Ok(result?),
                Err(_would_block) => continue,
            }
        }
    }

    fn cancel(&self) {
        self.cancel_notify.notify_waiters();
    }

    async fn close(&self) {
        let mut slot = self.inner.write().await;
        *slot = None;
    }
}

fn set_netlink_sockopt(fd: RawFd, name: libc::c_int, value: libc::c_int) -> std::io::Result<()> {
    let result = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_NETLINK,
            name,
            &value as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as u32,
        )
    };
    if result != 0 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// An in-memory [`DatagramEndpoint`] used by unit tests: `send` is
/// recorded, `recv` replays a scripted sequence of datagrams.
#[cfg(test)]
pub struct FakeEndpoint {
    open: AtomicBool,
    cancelled: AtomicBool,
    pub sent: tokio::sync::Mutex<Vec<Vec<u8>>>,
    replies: tokio::sync::Mutex<std::collections::VecDeque<Vec<u8>>>,
}

#[cfg(test)]
impl FakeEndpoint {
    pub fn new(replies: Vec<Vec<u8>>) -> Self {
        FakeEndpoint {
            open: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            sent: tokio::sync::Mutex::new(Vec::new()),
            replies: tokio::sync::Mutex::new(replies.into()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl DatagramEndpoint for FakeEndpoint {
    async fn open(&self, _protocol: i32, _groups: GroupMask) -> Result<(), NlError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn send(&self, buf: &[u8]) -> Result<usize, NlError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(NlError::Aborted);
        }
        self.sent.lock().await.push(buf.to_vec());
        Ok(buf.len())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, NlError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(NlError::Aborted);
        }
        let mut replies = self.replies.lock().await;
        match replies.pop_front() {
            Some(datagram) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(n)
            }
            None => Ok(0),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    async fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}
