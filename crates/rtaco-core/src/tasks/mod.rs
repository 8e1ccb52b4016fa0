//! Concrete request tasks: one module per kernel-route-channel operation.
//!
//! Each task owns a fully-framed request datagram built at construction
//! time and implements [`crate::request::RequestTask`] to interpret the
//! reply stream `run_request` drives it through.

pub mod dump_address;
pub mod dump_link;
pub mod dump_neighbor;
pub mod dump_route;
pub mod neighbor_flush;
pub mod neighbor_get;
pub mod neighbor_probe;

use rtaco_wire::align::align;
use rtaco_wire::header::MessageHeader;

/// Push a 16-byte `nlmsghdr` prefix onto `buf` with a placeholder length;
/// call [`finalize_length`] once the whole message has been appended.
pub(crate) fn append_header(buf: &mut Vec<u8>, message_type: u16, flags: u16, sequence: u32) {
    debug_assert!(buf.is_empty());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    buf.extend_from_slice(&message_type.to_ne_bytes());
    buf.extend_from_slice(&flags.to_ne_bytes());
    buf.extend_from_slice(&sequence.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    debug_assert_eq!(buf.len(), MessageHeader::LEN);
}

/// Append a 4-byte-aligned TLV attribute: `(len, type, payload, padding)`.
pub(crate) fn append_attribute(buf: &mut Vec<u8>, attr_type: u16, payload: &[u8]) {
    let len = (4 + payload.len()) as u16;
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&attr_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    let padded = align(buf.len());
    buf.resize(padded, 0);
}

/// Patch the header's length field now that the full message is known.
pub(crate) fn finalize_length(buf: &mut Vec<u8>) {
    let len = buf.len() as u32;
    buf[0..4].copy_from_slice(&len.to_ne_bytes());
}
