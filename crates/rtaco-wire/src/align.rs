//! Alignment rules and TLV iteration over a raw netlink message buffer.
//!
//! The kernel route-management wire format pads every message and every
//! attribute to a 4-byte boundary (`NLMSG_ALIGNTO` / `RTA_ALIGNTO`). The
//! iterators here never allocate and never panic on malformed input — a
//! truncated header or an attribute whose declared length overruns the
//! buffer simply ends iteration.

use crate::header::MessageHeader;

/// Round `len` up to the 4-byte boundary mandated by the wire format.
#[inline]
pub const fn align(len: usize) -> usize {
    (len + 3) & !3
}

/// Lazily walks a receive buffer, yielding `(header, message_body)` pairs.
///
/// `message_body` is the full aligned message (including any trailing
/// padding up to the next header) minus the fixed 16-byte header prefix.
/// Iteration stops, without yielding a final partial item, as soon as:
/// - fewer bytes remain than [`MessageHeader::LEN`], or
/// - the header's `length` field is smaller than [`MessageHeader::LEN`], or
/// - the header's `length` field claims more bytes than remain in the buffer.
pub struct MessageWalker<'a> {
    remaining: &'a [u8],
}

/// Build a [`MessageWalker`] over `bytes`.
pub fn walk_messages(bytes: &[u8]) -> MessageWalker<'_> {
    MessageWalker { remaining: bytes }
}

impl<'a> Iterator for MessageWalker<'a> {
    type Item = (MessageHeader, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.len() < MessageHeader::LEN {
            return None;
        }

        let header = MessageHeader::parse(self.remaining)?;
        let total_len = header.length as usize;
        if total_len < MessageHeader::LEN || total_len > self.remaining.len() {
            return None;
        }

        let aligned = align(total_len).min(self.remaining.len());
        let body = &self.remaining[MessageHeader::LEN..total_len];
        self.remaining = &self.remaining[aligned..];
        Some((header, body))
    }
}

/// Lazily walks the TLV attribute stream that follows the fixed
/// family-specific substructure of a message body.
///
/// `prefix_len` is `sizeof(family_payload)` for the message kind being
/// parsed (e.g. `size_of::<ifinfomsg>()` for link messages). Each attribute
/// is a 4-byte `(len, type)` prefix followed by `len - 4` bytes of payload,
/// 4-byte aligned to the next attribute. An attribute whose declared length
/// is shorter than the TLV prefix, or whose payload would overrun the
/// buffer, ends iteration at that attribute.
pub struct AttributeWalker<'a> {
    remaining: &'a [u8],
}

const ATTR_HEADER_LEN: usize = 4;

/// Build an [`AttributeWalker`] over the attribute region of `body`,
/// skipping the fixed `prefix_len`-byte family substructure.
pub fn walk_attributes(body: &[u8], prefix_len: usize) -> AttributeWalker<'_> {
    let aligned_prefix = align(prefix_len).min(body.len());
    AttributeWalker {
        remaining: &body[aligned_prefix..],
    }
}

impl<'a> Iterator for AttributeWalker<'a> {
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.len() < ATTR_HEADER_LEN {
            return None;
        }

        let attr_len = u16::from_ne_bytes([self.remaining[0], self.remaining[1]]) as usize;
        let attr_type = u16::from_ne_bytes([self.remaining[2], self.remaining[3]]);

        if attr_len < ATTR_HEADER_LEN || attr_len > self.remaining.len() {
            return None;
        }

        let payload = &self.remaining[ATTR_HEADER_LEN..attr_len];
        let aligned = align(attr_len).min(self.remaining.len());
        self.remaining = &self.remaining[aligned..];
        Some((attr_type, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_four() {
        assert_eq!(align(0), 0);
        assert_eq!(align(1), 4);
        assert_eq!(align(4), 4);
        assert_eq!(align(5), 8);
        assert_eq!(align(17), 20);
    }

    fn header_bytes(len: u32, msg_type: u16, seq: u32) -> Vec<u8> {
        let mut buf = vec![0u8; len as usize];
        buf[0..4].copy_from_slice(&len.to_ne_bytes());
        buf[4..6].copy_from_slice(&msg_type.to_ne_bytes());
        buf[8..12].copy_from_slice(&seq.to_ne_bytes());
        buf
    }

    #[test]
    fn walk_messages_yields_every_well_formed_header_exactly_once() {
        let mut buf = header_bytes(20, 1, 7);
        buf.extend(header_bytes(16, 2, 8));

        let headers: Vec<_> = walk_messages(&buf).map(|(h, _)| (h.message_type, h.sequence)).collect();
        assert_eq!(headers, vec![(1, 7), (2, 8)]);
    }

    #[test]
    fn walk_messages_stops_on_truncated_tail() {
        let buf = header_bytes(40, 1, 1); // claims more than is present
        let headers: Vec<_> = walk_messages(&buf[..16]).collect();
        assert!(headers.is_empty());
    }

    #[test]
    fn walk_messages_stops_when_length_too_small() {
        let buf = header_bytes(8, 1, 1); // shorter than fixed prefix
        let headers: Vec<_> = walk_messages(&buf).collect();
        assert!(headers.is_empty());
    }

    #[test]
    fn walk_messages_on_zero_length_buffer_yields_nothing() {
        assert!(walk_messages(&[]).next().is_none());
    }

    #[test]
    fn walk_attributes_stops_at_overrunning_attribute() {
        let mut body = vec![0u8; 8]; // 8-byte family substructure, no attrs
        body.extend_from_slice(&20u16.to_ne_bytes()); // claims 20 bytes
        body.extend_from_slice(&1u16.to_ne_bytes());
        body.extend_from_slice(&[0u8; 2]); // only 4 more bytes present

        let attrs: Vec<_> = walk_attributes(&body, 8).collect();
        assert!(attrs.is_empty());
    }

    #[test]
    fn walk_attributes_iterates_aligned_tlvs() {
        let mut body = vec![0u8; 4]; // 4-byte family substructure
        // attribute 1: type=5, payload "ab" -> len = 4 + 2 = 6, aligned to 8
        body.extend_from_slice(&6u16.to_ne_bytes());
        body.extend_from_slice(&5u16.to_ne_bytes());
        body.extend_from_slice(b"ab");
        body.extend_from_slice(&[0u8; 2]); // padding
                                            // attribute 2: type=6, payload 4 bytes -> len = 8
        body.extend_from_slice(&8u16.to_ne_bytes());
        body.extend_from_slice(&6u16.to_ne_bytes());
        body.extend_from_slice(&[9u8; 4]);

        let attrs: Vec<_> = walk_attributes(&body, 4).collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0, 5);
        assert_eq!(attrs[0].1, b"ab");
        assert_eq!(attrs[1].0, 6);
        assert_eq!(attrs[1].1, [9u8; 4]);
    }
}
