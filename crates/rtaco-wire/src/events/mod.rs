//! Typed event records and their parsers.
//!
//! Every parser follows the same shape: map the message type to an
//! [`Action`] (returning [`Action::Unknown`] for anything unrecognized),
//! verify the message is long enough to hold its fixed family payload,
//! decode that payload, then walk attributes and pick out the ones the
//! event cares about. A failed check at any step yields an event whose
//! action is [`Action::Unknown`] — callers must never dispatch such a
//! record as a signal.

mod address;
mod link;
mod neighbor;
mod route;

pub use address::AddressEvent;
pub use link::LinkEvent;
pub use neighbor::NeighborEvent;
pub use route::RouteEvent;

/// Whether an event announces a new record, the deletion of one, or
/// (for a malformed message) neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Unknown,
    New,
    Delete,
}
