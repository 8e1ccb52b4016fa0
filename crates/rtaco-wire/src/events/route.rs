use super::Action;
use crate::align::walk_attributes;
use crate::decode::{decode_ip_addr, decode_u32};
use crate::header::MessageHeader;

/// Size of the fixed `rtmsg` substructure: family, dst_len, src_len, tos,
/// table, protocol, scope, type, flags.
const RTMSG_LEN: usize = 12;

/// A route creation or removal, or one entry of a route dump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteEvent {
    pub action: Action,
    pub family: u8,
    pub dst_prefix_len: u8,
    pub src_prefix_len: u8,
    pub scope: u8,
    pub protocol: u8,
    pub route_type: u8,
    pub flags: u32,
    pub table: u32,
    pub priority: u32,
    pub oif_index: u32,
    pub dst: Option<String>,
    pub src: Option<String>,
    pub gateway: Option<String>,
    pub prefsrc: Option<String>,
    pub oif: Option<String>,
}

impl RouteEvent {
    /// Parse a `RouteEvent`. If no interface-name attribute is present
    /// (the wire format carries none), `oif` is synthesized as the
    /// decimal text of `oif_index` once it is known to be nonzero.
    pub fn parse(header: &MessageHeader, body: &[u8]) -> RouteEvent {
        let action = match header.message_type as i32 {
            libc::RTM_NEWROUTE => Action::New,
            libc::RTM_DELROUTE => Action::Delete,
            _ => Action::Unknown,
        };

        if action == Action::Unknown {
            return RouteEvent::default();
        }

        if header.length as usize < MessageHeader::LEN + RTMSG_LEN {
            log::debug!("route message too short for rtmsg");
            return RouteEvent::default();
        }

        let family = body[0];
        let dst_prefix_len = body[1];
        let src_prefix_len = body[2];
        let scope = body[4];
        let protocol = body[5];
        let route_type = body[7];
        let flags = u32::from_ne_bytes(body[8..12].try_into().expect("4 bytes"));

        let mut event = RouteEvent {
            action,
            family,
            dst_prefix_len,
            src_prefix_len,
            scope,
            protocol,
            route_type,
            flags,
            table: body[3] as u32,
            priority: 0,
            oif_index: 0,
            dst: None,
            src: None,
            gateway: None,
            prefsrc: None,
            oif: None,
        };

        for (attr_type, payload) in walk_attributes(body, RTMSG_LEN) {
            match attr_type as i32 {
                libc::RTA_TABLE => event.table = decode_u32(payload),
                libc::RTA_DST => event.dst = Some(decode_ip_addr(payload, family)),
                libc::RTA_SRC => event.src = Some(decode_ip_addr(payload, family)),
                libc::RTA_GATEWAY => event.gateway = Some(decode_ip_addr(payload, family)),
                libc::RTA_PREFSRC => event.prefsrc = Some(decode_ip_addr(payload, family)),
                libc::RTA_OIF => event.oif_index = decode_u32(payload),
                libc::RTA_PRIORITY => event.priority = decode_u32(payload),
                _ => {}
            }
        }

        if event.oif_index != 0 {
            event.oif = Some(event.oif_index.to_string());
        }

        event
    }
}
