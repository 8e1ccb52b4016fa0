//! Wire-format codec and typed event model for the Linux kernel
//! route-management (netlink) channel.
//!
//! This crate has no socket of its own — it only knows how to walk the
//! kernel's variable-length, TLV-structured message stream and turn it
//! into owned, typed records ([`events::LinkEvent`], [`events::AddressEvent`],
//! [`events::RouteEvent`], [`events::NeighborEvent`]). `rtaco-core` builds
//! the socket, the listener, and the request/reply engine on top of it.

pub mod align;
pub mod decode;
pub mod events;
pub mod flags;
pub mod header;

pub use align::{walk_attributes, walk_messages};
pub use events::Action;
pub use header::MessageHeader;
