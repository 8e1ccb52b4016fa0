use super::Action;
use crate::align::walk_attributes;
use crate::decode::{decode_ip_addr, decode_text};
use crate::flags::AddressFlags;
use crate::header::MessageHeader;

/// Size of the fixed `ifaddrmsg` substructure: family, prefixlen, flags,
/// scope, index.
const IFADDRMSG_LEN: usize = 8;

/// An address assignment or removal on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressEvent {
    pub action: Action,
    pub index: i32,
    pub prefix_len: u8,
    pub scope: u8,
    pub flags: AddressFlags,
    pub family: u8,
    pub address: String,
    pub label: Option<String>,
}

impl AddressEvent {
    /// Parse an `AddressEvent`. Prefers the local-address attribute
    /// (`IFA_LOCAL`) over the peer address (`IFA_ADDRESS`) when both are
    /// present, matching how the kernel reports point-to-point links.
    pub fn parse(header: &MessageHeader, body: &[u8]) -> AddressEvent {
        let action = match header.message_type as i32 {
            libc::RTM_NEWADDR => Action::New,
            libc::RTM_DELADDR => Action::Delete,
            _ => Action::Unknown,
        };

        if action == Action::Unknown {
            return AddressEvent::default();
        }

        if header.length as usize < MessageHeader::LEN + IFADDRMSG_LEN {
            log::debug!("address message too short for ifaddrmsg");
            return AddressEvent::default();
        }

        let family = body[0];
        let prefix_len = body[1];
        let flags = AddressFlags::from_bits_truncate(body[2] as u32);
        let scope = body[3];
        let index = i32::from_ne_bytes(body[4..8].try_into().expect("4 bytes"));

        let mut local_address = String::new();
        let mut peer_address = String::new();
        let mut label = None;

        for (attr_type, payload) in walk_attributes(body, IFADDRMSG_LEN) {
            match attr_type as i32 {
                libc::IFA_LOCAL => local_address = decode_ip_addr(payload, family),
                libc::IFA_ADDRESS => peer_address = decode_ip_addr(payload, family),
                libc::IFA_LABEL => label = Some(decode_text(payload)),
                _ => {}
            }
        }

        let address = if !local_address.is_empty() {
            local_address
        } else {
            peer_address
        };

        AddressEvent {
            action,
            index,
            prefix_len,
            scope,
            flags,
            family,
            address,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_message(msg_type: i32, family: u8, prefix_len: u8, local: Option<[u8; 4]>, peer: Option<[u8; 4]>) -> (MessageHeader, Vec<u8>) {
        let mut body = vec![0u8; IFADDRMSG_LEN];
        body[0] = family;
        body[1] = prefix_len;
        body[4..8].copy_from_slice(&3i32.to_ne_bytes());

        if let Some(addr) = local {
            body.extend_from_slice(&8u16.to_ne_bytes());
            body.extend_from_slice(&(libc::IFA_LOCAL as u16).to_ne_bytes());
            body.extend_from_slice(&addr);
        }
        if let Some(addr) = peer {
            body.extend_from_slice(&8u16.to_ne_bytes());
            body.extend_from_slice(&(libc::IFA_ADDRESS as u16).to_ne_bytes());
            body.extend_from_slice(&addr);
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
    fn prefers_local_over_peer_address() {
        let (header, body) = address_message(
            libc::RTM_NEWADDR,
            libc::AF_INET as u8,
            24,
            Some([10, 0, 0, 1]),
            Some([10, 0, 0, 2]),
        );
        let event = AddressEvent::parse(&header, &body);
        assert_eq!(event.action, Action::New);
        assert_eq!(event.address, "10.0.0.1");
        assert_eq!(event.prefix_len, 24);
    }

    #[test]
    fn falls_back_to_peer_address_when_no_local() {
        let (header, body) = address_message(
            libc::RTM_NEWADDR,
            libc::AF_INET as u8,
            32,
            None,
            Some([10, 0, 0, 2]),
        );
        let event = AddressEvent::parse(&header, &body);
        assert_eq!(event.address, "10.0.0.2");
    }
}
