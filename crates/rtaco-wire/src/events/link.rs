use super::Action;
use crate::align::walk_attributes;
use crate::decode::decode_text;
use crate::flags::LinkFlags;
use crate::header::MessageHeader;

/// Size of the fixed `ifinfomsg` substructure: family, pad, type, index,
/// flags, change.
const IFINFOMSG_LEN: usize = 16;

/// A network-interface creation, update, or deletion announced by the
/// kernel, or requested via a link dump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkEvent {
    pub action: Action,
    pub index: i32,
    pub flags: LinkFlags,
    pub change: u32,
    pub name: String,
}

impl LinkEvent {
    /// Parse a `LinkEvent` from a message header and its body. Returns an
    /// event with `action == Action::Unknown` if any validation step
    /// fails; such an event must not be delivered to a handler.
    pub fn parse(header: &MessageHeader, body: &[u8]) -> LinkEvent {
        let action = match header.message_type as i32 {
            libc::RTM_NEWLINK => Action::New,
            libc::RTM_DELLINK => Action::Delete,
            _ => Action::Unknown,
        };

        if action == Action::Unknown {
            return LinkEvent::default();
        }

        if header.length as usize < MessageHeader::LEN + IFINFOMSG_LEN {
            log::debug!("link message too short for ifinfomsg");
            return LinkEvent::default();
        }

        let index = i32::from_ne_bytes(body[4..8].try_into().expect("4 bytes"));
        let flags = LinkFlags::from_bits_truncate(u32::from_ne_bytes(
            body[8..12].try_into().expect("4 bytes"),
        ));
        let change = u32::from_ne_bytes(body[12..16].try_into().expect("4 bytes"));

        let mut name = String::new();
        for (attr_type, payload) in walk_attributes(body, IFINFOMSG_LEN) {
            if attr_type as i32 == libc::IFLA_IFNAME {
                name = decode_text(payload);
            }
        }

        LinkEvent {
            action,
            index,
            flags,
            change,
            name,
        }
    }
}
