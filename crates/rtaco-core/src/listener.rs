//! The passive subscription loop: one outstanding receive at a time,
//! fanning parsed events out to connected handlers.

use std::sync::atomic::{AtomicBool, Ordering};

use rtaco_wire::align::walk_messages;
use rtaco_wire::events::{AddressEvent, LinkEvent, NeighborEvent, RouteEvent};
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use crate::endpoint::{DatagramEndpoint, LISTENER_BUFFER_SIZE};
use crate::error::NlError;
use crate::guard::SocketGuard;
use crate::dispatcher::Dispatcher;
use rtaco_wire::flags::GroupMask;

/// A raw protocol error message observed on the broadcast channel, paired
/// with the header that carried it.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub code: i32,
    pub header: MessageHeader,
}

/// Subscribes to the kernel's broadcast groups and dispatches typed
/// events to whatever is connected to its signals.
///
/// Owns exactly one [`SocketGuard`] for its lifetime. `start`/`stop` only
/// toggle the running flag and the guard's open/close state; the actual
/// receive loop is driven by [`Self::run`], which callers typically
/// `tokio::spawn`.
pub struct Listener<E: DatagramEndpoint> {
    guard: SocketGuard<E>,
    running: AtomicBool,
    pub on_link: Dispatcher<LinkEvent>,
    pub on_address: Dispatcher<AddressEvent>,
    pub on_route: Dispatcher<RouteEvent>,
    pub on_neighbor: Dispatcher<NeighborEvent>,
    pub on_error: Dispatcher<ErrorEvent>,
}

impl<E: DatagramEndpoint> Listener<E> {
    pub fn new(endpoint: E) -> Self {
        Listener {
            guard: SocketGuard::new(endpoint, libc::NETLINK_ROUTE, GroupMask::LISTENER_DEFAULT),
            running: AtomicBool::new(false),
            on_link: Dispatcher::new(),
            on_address: Dispatcher::new(),
            on_route: Dispatcher::new(),
            on_neighbor: Dispatcher::new(),
            on_error: Dispatcher::new(),
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Open the guarded socket subscribed to the listener's default
    /// groups and mark the listener running. Call [`Self::run`]
    /// afterwards to actually process datagrams.
    pub async fn start(&self) -> Result<(), NlError> {
        self.guard.ensure_open().await?;
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Atomically stop: cancel any outstanding receive and close the
    /// socket. Idempotent; `start()` afterwards reopens a fresh listener.
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.guard.stop().await;
    }

    /// The continuous read loop. Runs until [`Self::stop`] is called (the
    /// pending receive completes with [`NlError::Aborted`]) or an
    /// unrecoverable I/O error occurs.
    pub async fn run(&self) -> Result<(), NlError> {
        let socket = self.guard.socket();
        let mut buf = vec![0u8; LISTENER_BUFFER_SIZE];

        while self.running() {
            let n = match socket.recv(&mut buf).await {
                Ok(n) => n,
                Err(NlError::Aborted) => {
                    log::debug!("listener receive aborted");
                    break;
                }
                Err(error) => {
                    log::warn!("listener receive failed, re-issuing: {error}");
                    continue;
                }
            };

            if n == 0 {
                continue;
            }

            self.dispatch(&buf[..n]);
        }

        Ok(())
    }

    fn dispatch(&self, datagram: &[u8]) {
        for (header, body) in walk_messages(datagram) {
            match header.message_type as i32 {
                libc::RTM_NEWLINK | libc::RTM_DELLINK => {
                    let event = LinkEvent::parse(&header, body);
                    if event.action != Action::Unknown {
                        self.on_link.emit(event);
                    }
                }
                libc::RTM_NEWADDR | libc::RTM_DELADDR => {
                    let event = AddressEvent::parse(&header, body);
                    if event.action != Action::Unknown {
                        self.on_address.emit(event);
                    }
                }
                libc::RTM_NEWROUTE | libc::RTM_DELROUTE => {
                    let event = RouteEvent::parse(&header, body);
                    if event.action != Action::Unknown {
                        self.on_route.emit(event);
                    }
                }
                libc::RTM_NEWNEIGH | libc::RTM_DELNEIGH => {
                    let event = NeighborEvent::parse(&header, body);
                    if event.action != Action::Unknown {
                        self.on_neighbor.emit(event);
                    }
                }
                libc::NLMSG_ERROR => {
                    if body.len() < 4 {
                        log::debug!("error message too short to carry an error code");
                        continue;
                    }
                    let code = i32::from_ne_bytes(body[0..4].try_into().expect("4 bytes"));
                    self.on_error.emit(ErrorEvent { code, header });
                }
                libc::NLMSG_DONE | libc::NLMSG_NOOP | libc::NLMSG_OVERRUN => {}
                _ => log::trace!("ignoring unrecognized message type {}", header.message_type),
            }
        }
    }
}
