use rtaco_wire::events::NeighborEvent;
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use super::{append_attribute, append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

/// Size of the fixed `ndmsg` substructure this request carries.
const NDMSG_LEN: usize = 12;

/// Looks up one neighbor entry by destination address, returning its
/// link-layer address once the kernel reports it.
///
/// `ndm_family` is left unspecified (wildcard); the kernel matches on the
/// destination attribute's address alone. `NDA_DST` is always carried as
/// 16 raw bytes; callers targeting an IPv4 neighbor map it into
/// IPv4-mapped IPv6 form first.
pub struct NeighborGetTask {
    sequence: u32,
    request: Vec<u8>,
}

impl NeighborGetTask {
    pub fn new(sequence: u32, ifindex: i32, address: [u8; 16]) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + NDMSG_LEN + 20);
        append_header(
            &mut request,
            libc::RTM_GETNEIGH as u16,
            libc::NLM_F_REQUEST as u16,
            sequence,
        );

        let mut ndmsg = [0u8; NDMSG_LEN];
        ndmsg[0] = libc::AF_UNSPEC as u8;
        ndmsg[4..8].copy_from_slice(&ifindex.to_ne_bytes());
        request.extend_from_slice(&ndmsg);

        if ifindex != 0 {
            append_attribute(&mut request, libc::NDA_DST as u16, &address);
        }
        finalize_length(&mut request);

        NeighborGetTask { sequence, request }
    }
}

impl RequestTask for NeighborGetTask {
    type Output = NeighborEvent;

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<NeighborEvent> {
        if header.message_type as i32 != libc::RTM_NEWNEIGH {
            return None;
        }
        let event = NeighborEvent::parse(header, body);
        if event.action != Action::New {
            return None;
        }
        if event.lladdr.is_some() {
            return Some(event);
        }
        None
    }

    fn on_terminator(&mut self) -> Result<NeighborEvent, NlError> {
        Err(NlError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FakeEndpoint;
    use crate::request::run_request;

    fn neighbor_message(sequence: u32, lladdr: Option<[u8; 6]>) -> Vec<u8> {
        let mut body = vec![0u8; NDMSG_LEN];
        body[0] = libc::AF_INET6 as u8;
        body[4..8].copy_from_slice(&2i32.to_ne_bytes());

        body.extend_from_slice(&20u16.to_ne_bytes());
        body.extend_from_slice(&(libc::NDA_DST as u16).to_ne_bytes());
        body.extend_from_slice(&[0u8; 16]);

        if let Some(mac) = lladdr {
            body.extend_from_slice(&10u16.to_ne_bytes());
            body.extend_from_slice(&(libc::NDA_LLADDR as u16).to_ne_bytes());
            body.extend_from_slice(&mac);
            body.extend_from_slice(&[0u8; 2]);
        }

        let header = MessageHeader {
            length: (MessageHeader::LEN + body.len()) as u32,
            message_type: libc::RTM_NEWNEIGH as u16,
            flags: 0,
            sequence,
            port_id: 0,
        };
        let mut buf = vec![0u8; MessageHeader::LEN];
        header.write_into(&mut buf);
        buf.extend_from_slice(&body);
        buf
    }

    fn done_message(sequence: u32) -> Vec<u8> {
        let header = MessageHeader {
            length: MessageHeader::LEN as u32,
            message_type: libc::NLMSG_DONE as u16,
            flags: 0,
            sequence,
            port_id: 0,
        };
        let mut buf = vec![0u8; MessageHeader::LEN];
        header.write_into(&mut buf);
        buf
    }

    #[tokio::test]
    async fn resolves_when_lladdr_present() {
        let endpoint = FakeEndpoint::new(vec![neighbor_message(
            6,
            Some([0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]),
        )]);
        let mut task = NeighborGetTask::new(6, 2, [0u8; 16]);
        let result = run_request(&endpoint, &mut task).await.unwrap();
        assert_eq!(result.lladdr.as_deref(), Some("12:34:56:78:9a:bc"));
    }

    #[tokio::test]
    async fn not_found_when_terminator_arrives_first() {
        let endpoint = FakeEndpoint::new(vec![done_message(6)]);
        let mut task = NeighborGetTask::new(6, 2, [0u8; 16]);
        let result = run_request(&endpoint, &mut task).await;
        assert!(matches!(result, Err(NlError::NotFound)));
    }
}
