//! The active control façade: serializes request tasks over one socket
//! guard and exposes both blocking and awaitable entry points.

use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::Semaphore;

use rtaco_wire::events::{AddressEvent, LinkEvent, NeighborEvent, RouteEvent};
use rtaco_wire::flags::GroupMask;

use crate::endpoint::DatagramEndpoint;
use crate::error::NlError;
use crate::guard::SocketGuard;
use crate::request::run_request;
use crate::tasks::dump_address::AddressDumpTask;
use crate::tasks::dump_link::LinkDumpTask;
use crate::tasks::dump_neighbor::NeighborDumpTask;
use crate::tasks::dump_route::RouteDumpTask;
use crate::tasks::neighbor_flush::NeighborFlushTask;
use crate::tasks::neighbor_get::NeighborGetTask;
use crate::tasks::neighbor_probe::NeighborProbeTask;

/// Issues dump and neighbor-mutation requests against the kernel route
/// channel, one at a time.
///
/// Every request is gated behind a single-permit [`Semaphore`]: acquiring
/// a permit is FIFO relative to other waiters in `tokio`'s implementation,
/// which reproduces the ordering the original's timer-expiry trick
/// provided without repurposing a timer for it (see `DESIGN.md`).
pub struct Control<E: DatagramEndpoint> {
    guard: SocketGuard<E>,
    gate: Semaphore,
    sequence: AtomicU32,
}

impl<E: DatagramEndpoint> Control<E> {
    pub fn new(endpoint: E) -> Self {
        Control {
            guard: SocketGuard::new(endpoint, libc::NETLINK_ROUTE, GroupMask::empty()),
            gate: Semaphore::new(1),
            sequence: AtomicU32::new(1),
        }
    }

    /// Forwards to the guard; any request awaiting its turn or already in
    /// flight sees [`NlError::Aborted`].
    pub async fn stop(&self) {
        self.guard.stop().await;
    }

    fn next_sequence(&self) -> u32 {
        let value = self.sequence.fetch_add(1, Ordering::Relaxed);
        if value == 0 {
            self.sequence.fetch_add(1, Ordering::Relaxed)
        } else {
            value
        }
    }

    pub async fn dump_links(&self) -> Result<Vec<LinkEvent>, NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = LinkDumpTask::new(self.next_sequence());
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn dump_addresses(&self) -> Result<Vec<AddressEvent>, NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = AddressDumpTask::new(self.next_sequence());
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn dump_routes(&self) -> Result<Vec<RouteEvent>, NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = RouteDumpTask::new(self.next_sequence());
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn dump_neighbors(&self) -> Result<Vec<NeighborEvent>, NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = NeighborDumpTask::new(self.next_sequence());
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn get_neighbor(
        &self,
        ifindex: i32,
        address: [u8; 16],
    ) -> Result<NeighborEvent, NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = NeighborGetTask::new(self.next_sequence(), ifindex, address);
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn probe_neighbor(&self, ifindex: i32, address: [u8; 16]) -> Result<(), NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = NeighborProbeTask::new(self.next_sequence(), ifindex, address);
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    pub async fn flush_neighbor(&self, ifindex: i32, address: [u8; 16]) -> Result<(), NlError> {
        let _permit = self.gate.acquire().await.map_err(|_| NlError::Aborted)?;
        self.guard.ensure_open().await?;
        let mut task = NeighborFlushTask::new(self.next_sequence(), ifindex, address);
        run_request(self.guard.socket().as_ref(), &mut task).await
    }

    /// Blocking counterparts. Each spawns the same request onto `handle`
    /// and waits for it; calling one from a thread that is itself driving
    /// `handle`'s runtime deadlocks, matching the awaitable form's
    /// execution-context restriction.
    pub fn dump_links_blocking(&self, handle: &tokio::runtime::Handle) -> Result<Vec<LinkEvent>, NlError> {
        handle.block_on(self.dump_links())
    }

    pub fn dump_addresses_blocking(&self, handle: &tokio::runtime::Handle) -> Result<Vec<AddressEvent>, NlError> {
        handle.block_on(self.dump_addresses())
    }

    pub fn dump_routes_blocking(&self, handle: &tokio::runtime::Handle) -> Result<Vec<RouteEvent>, NlError> {
        handle.block_on(self.dump_routes())
    }

    pub fn dump_neighbors_blocking(&self, handle: &tokio::runtime::Handle) -> Result<Vec<NeighborEvent>, NlError> {
        handle.block_on(self.dump_neighbors())
    }

    pub fn get_neighbor_blocking(
        &self,
        handle: &tokio::runtime::Handle,
        ifindex: i32,
        address: [u8; 16],
    ) -> Result<NeighborEvent, NlError> {
        handle.block_on(self.get_neighbor(ifindex, address))
    }

    pub fn probe_neighbor_blocking(
        &self,
        handle: &tokio::runtime::Handle,
        ifindex: i32,
        address: [u8; 16],
    ) -> Result<(), NlError> {
        handle.block_on(self.probe_neighbor(ifindex, address))
    }

    pub fn flush_neighbor_blocking(
        &self,
        handle: &tokio::runtime::Handle,
        ifindex: i32,
        address: [u8; 16],
    ) -> Result<(), NlError> {
        handle.block_on(self.flush_neighbor(ifindex, address))
    }
}
