//! Typed decoders for attribute payload spans.
//!
//! Each decoder takes the raw payload span yielded by
//! [`crate::align::walk_attributes`] and returns an owned value, never a
//! borrowed reference into the original buffer — decoded values must
//! outlive the receive buffer they were parsed from.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Decode a host-order `u32` from an attribute payload. Returns `0` if the
/// payload is shorter than 4 bytes.
pub fn decode_u32(payload: &[u8]) -> u32 {
    match payload.get(0..4) {
        Some(bytes) => u32::from_ne_bytes(bytes.try_into().expect("slice is 4 bytes")),
        None => 0,
    }
}

/// Decode a printable, NUL-trimmed string from an attribute payload.
pub fn decode_text(payload: &[u8]) -> String {
    let trimmed = match payload.iter().position(|&b| b == 0) {
        Some(nul_at) => &payload[..nul_at],
        None => payload,
    };
    String::from_utf8_lossy(trimmed).into_owned()
}

/// Decode an IPv4/IPv6 address into presentation form. `family` is
/// `AF_INET` or `AF_INET6`; any other family, or a payload too short for
/// the family, yields an empty string.
pub fn decode_ip_addr(payload: &[u8], family: u8) -> String {
    match family as i32 {
        libc::AF_INET => match payload.get(0..4) {
            Some(bytes) => {
                let octets: [u8; 4] = bytes.try_into().expect("slice is 4 bytes");
                Ipv4Addr::from(octets).to_string()
            }
            None => String::new(),
        },
        libc::AF_INET6 => match payload.get(0..16) {
            Some(bytes) => {
                let octets: [u8; 16] = bytes.try_into().expect("slice is 16 bytes");
                Ipv6Addr::from(octets).to_string()
            }
            None => String::new(),
        },
        _ => String::new(),
    }
}

/// Decode a hardware (MAC) address into colon-separated lowercase hex.
pub fn decode_mac(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
