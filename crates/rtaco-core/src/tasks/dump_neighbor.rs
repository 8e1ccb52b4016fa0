use rtaco_wire::events::NeighborEvent;
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use super::{append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

/// Size of the fixed `ndmsg` substructure this request carries.
const NDMSG_LEN: usize = 12;

/// Dumps the full neighbor (ARP/NDP) table across all interfaces.
pub struct NeighborDumpTask {
    sequence: u32,
    request: Vec<u8>,
    learned: Vec<NeighborEvent>,
}

impl NeighborDumpTask {
    pub fn new(sequence: u32) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + NDMSG_LEN);
        append_header(
            &mut request,
            libc::RTM_GETNEIGH as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_DUMP) as u16,
            sequence,
        );
        request.resize(MessageHeader::LEN + NDMSG_LEN, 0);
        finalize_length(&mut request);

        NeighborDumpTask {
            sequence,
            request,
            learned: Vec::new(),
        }
    }
}

impl RequestTask for NeighborDumpTask {
    type Output = Vec<NeighborEvent>;

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<Vec<NeighborEvent>> {
        if header.message_type as i32 != libc::RTM_NEWNEIGH {
            return None;
        }
        let event = NeighborEvent::parse(header, body);
        if event.action != Action::New {
            return None;
        }
        if event.index <= 0 || event.index > u16::MAX as i32 {
            return None;
        }
        self.learned.push(event);
        None
    }

    fn on_terminator(&mut self) -> Result<Vec<NeighborEvent>, NlError> {
        Ok(std::mem::take(&mut self.learned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FakeEndpoint;
    use crate::request::run_request;
    use rtaco_wire::decode::decode_ip_addr;

    fn neighbor_message(sequence: u32, index: i32, addr: [u8; 16], lladdr: [u8; 6]) -> Vec<u8> {
        let mut body = vec![0u8; NDMSG_LEN];
        body[0] = libc::AF_INET6 as u8;
        body[4..8].copy_from_slice(&index.to_ne_bytes());
        body[8..10].copy_from_slice(&(libc::NUD_REACHABLE as u16).to_ne_bytes());

        body.extend_from_slice(&20u16.to_ne_bytes());
        body.extend_from_slice(&(libc::NDA_DST as u16).to_ne_bytes());
        body.extend_from_slice(&addr);

        body.extend_from_slice(&10u16.to_ne_bytes());
        body.extend_from_slice(&(libc::NDA_LLADDR as u16).to_ne_bytes());
        body.extend_from_slice(&lladdr);
        body.extend_from_slice(&[0u8; 2]);

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
    async fn two_entry_dump_preserves_arrival_order() {
        let first = std::net::Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1).octets();
        let second = std::net::Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2).octets();
        let endpoint = FakeEndpoint::new(vec![
            neighbor_message(2, 3, first, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x01]),
            neighbor_message(2, 3, second, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x02]),
            done_message(2),
        ]);
        let mut task = NeighborDumpTask::new(2);
        let result = run_request(&endpoint, &mut task).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].address, decode_ip_addr(&first, libc::AF_INET6 as u8));
        assert_eq!(result[1].address, decode_ip_addr(&second, libc::AF_INET6 as u8));
    }
}
