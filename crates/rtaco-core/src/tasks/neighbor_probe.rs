use rtaco_wire::header::MessageHeader;

use super::{append_attribute, append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

const NDMSG_LEN: usize = 12;

/// Forces the kernel to (re-)probe reachability of a neighbor entry,
/// creating it if absent.
pub struct NeighborProbeTask {
    sequence: u32,
    request: Vec<u8>,
}

impl NeighborProbeTask {
    pub fn new(sequence: u32, ifindex: i32, address: [u8; 16]) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + NDMSG_LEN + 20);
        append_header(
            &mut request,
            libc::RTM_NEWNEIGH as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_ACK | libc::NLM_F_CREATE | libc::NLM_F_REPLACE)
                as u16,
            sequence,
        );

        let mut ndmsg = [0u8; NDMSG_LEN];
        ndmsg[0] = libc::AF_UNSPEC as u8;
        ndmsg[4..8].copy_from_slice(&ifindex.to_ne_bytes());
        ndmsg[8..10].copy_from_slice(&(libc::NUD_PROBE as u16).to_ne_bytes());
        ndmsg[10] = libc::NTF_USE as u8;
        request.extend_from_slice(&ndmsg);

        append_attribute(&mut request, libc::NDA_DST as u16, &address);
        finalize_length(&mut request);

        NeighborProbeTask { sequence, request }
    }
}

impl RequestTask for NeighborProbeTask {
    type Output = ();

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, _header: &MessageHeader, _body: &[u8]) -> Option<()> {
        None
    }

    fn on_terminator(&mut self) -> Result<(), NlError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FakeEndpoint;
    use crate::request::run_request;

    fn error_message(sequence: u32, code: i32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&code.to_ne_bytes());
        body.extend_from_slice(&[0u8; MessageHeader::LEN]);
        let header = MessageHeader {
            length: (MessageHeader::LEN + body.len()) as u32,
            message_type: libc::NLMSG_ERROR as u16,
            flags: 0,
            sequence,
            port_id: 0,
        };
        let mut buf = vec![0u8; MessageHeader::LEN];
        header.write_into(&mut buf);
        buf.extend_from_slice(&body);
        buf
    }

    #[tokio::test]
    async fn positive_ack_succeeds() {
        let endpoint = FakeEndpoint::new(vec![error_message(8, 0)]);
        let mut task = NeighborProbeTask::new(8, 2, [0u8; 16]);
        run_request(&endpoint, &mut task).await.unwrap();
    }

    #[tokio::test]
    async fn negative_ack_surfaces_protocol_error() {
        let endpoint = FakeEndpoint::new(vec![error_message(8, -13)]);
        let mut task = NeighborProbeTask::new(8, 2, [0u8; 16]);
        let result = run_request(&endpoint, &mut task).await;
        assert!(matches!(result, Err(NlError::Protocol(13))));
    }

    #[test]
    fn request_round_trips_ifindex_and_address() {
        let address = [0xfeu8, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xab, 0xcd];
        let task = NeighborProbeTask::new(3, 7, address);
        let (header, body) = rtaco_wire::align::walk_messages(&task.request)
            .next()
            .expect("one framed message");
        assert_eq!(header.message_type, libc::RTM_NEWNEIGH as u16);
        let ifindex = i32::from_ne_bytes(body[4..8].try_into().unwrap());
        assert_eq!(ifindex, 7);
        let (attr_type, payload) = rtaco_wire::align::walk_attributes(body, NDMSG_LEN)
            .next()
            .expect("one attribute");
        assert_eq!(attr_type as i32, libc::NDA_DST);
        assert_eq!(payload, &address);
    }
}
