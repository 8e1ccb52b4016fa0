use super::Action;
use crate::align::walk_attributes;
use crate::decode::{decode_ip_addr, decode_mac};
use crate::flags::NeighborState;
use crate::header::MessageHeader;

/// Size of the fixed `ndmsg` substructure: family, pad, ifindex, state,
/// flags, type.
const NDMSG_LEN: usize = 12;

/// A neighbor (ARP/NDP) table entry creation or removal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborEvent {
    pub action: Action,
    pub index: i32,
    pub family: u8,
    pub state: NeighborState,
    pub flags: u8,
    pub kind: u8,
    pub address: String,
    pub lladdr: Option<String>,
}

impl NeighborEvent {
    pub fn parse(header: &MessageHeader, body: &[u8]) -> NeighborEvent {
        let action = match header.message_type as i32 {
            libc::RTM_NEWNEIGH => Action::New,
            libc::RTM_DELNEIGH => Action::Delete,
            _ => Action::Unknown,
        };

        if action == Action::Unknown {
            return NeighborEvent::default();
        }

        if header.length as usize < MessageHeader::LEN + NDMSG_LEN {
            log::debug!("neighbor message too short for ndmsg");
            return NeighborEvent::default();
        }

        let family = body[0];
        let index = i32::from_ne_bytes(body[4..8].try_into().expect("4 bytes"));
        let state = NeighborState::from_bits_truncate(u16::from_ne_bytes(
            body[8..10].try_into().expect("2 bytes"),
        ));
        let flags = body[10];
        let kind = body[11];

        let mut address = String::new();
        let mut lladdr = None;

        for (attr_type, payload) in walk_attributes(body, NDMSG_LEN) {
            match attr_type as i32 {
                libc::NDA_DST => address = decode_ip_addr(payload, family),
                libc::NDA_LLADDR => lladdr = Some(decode_mac(payload)),
                _ => {}
            }
        }

        NeighborEvent {
            action,
            index,
            family,
            state,
            flags,
            kind,
            address,
            lladdr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor_message(msg_type: i32, index: i32, state: u16, dst: [u8; 16], lladdr: Option<[u8; 6]>) -> (MessageHeader, Vec<u8>) {
        let mut body = vec![0u8; NDMSG_LEN];
        body[0] = libc::AF_INET6 as u8;
        body[4..8].copy_from_slice(&index.to_ne_bytes());
        body[8..10].copy_from_slice(&state.to_ne_bytes());

        body.extend_from_slice(&20u16.to_ne_bytes());
        body.extend_from_slice(&(libc::NDA_DST as u16).to_ne_bytes());
        body.extend_from_slice(&dst);

        if let Some(mac) = lladdr {
            body.extend_from_slice(&10u16.to_ne_bytes());
            body.extend_from_slice(&(libc::NDA_LLADDR as u16).to_ne_bytes());
            body.extend_from_slice(&mac);
        }

        let header = MessageHeader {
            length: (MessageHeader::LEN + body.len()) as u32,
            message_type: msg_type as u16,
            flags: 0,
            sequence: 1,
            port_id: 0,
        };
        (header, body)
    }

    #[test]
    fn parses_new_neighbor_with_lladdr() {
        let addr = std::net::Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1).octets();
        let (header, body) = neighbor_message(
            libc::RTM_NEWNEIGH,
            3,
            libc::NUD_REACHABLE as u16,
            addr,
            Some([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01]),
        );
        let event = NeighborEvent::parse(&header, &body);
        assert_eq!(event.action, Action::New);
        assert_eq!(event.index, 3);
        assert_eq!(event.address, "fe80::1");
        assert_eq!(event.lladdr.as_deref(), Some("aa:bb:cc:dd:ee:01"));
        assert!(event.state.contains(NeighborState::REACHABLE));
    }

    #[test]
    fn delete_action_recognized() {
        let addr = [0u8; 16];
        let (header, body) = neighbor_message(libc::RTM_DELNEIGH, 3, 0, addr, None);
        let event = NeighborEvent::parse(&header, &body);
        assert_eq!(event.action, Action::Delete);
        assert_eq!(event.lladdr, None);
    }
}
