use rtaco_wire::header::MessageHeader;

use super::{append_attribute, append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

const NDMSG_LEN: usize = 12;

/// Removes one neighbor entry.
pub struct NeighborFlushTask {
    sequence: u32,
    request: Vec<u8>,
}

impl NeighborFlushTask {
    pub fn new(sequence: u32, ifindex: i32, address: [u8; 16]) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + NDMSG_LEN + 20);
        append_header(
            &mut request,
            libc::RTM_DELNEIGH as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_ACK) as u16,
            sequence,
        );

        let mut ndmsg = [0u8; NDMSG_LEN];
        ndmsg[0] = libc::AF_UNSPEC as u8;
        ndmsg[4..8].copy_from_slice(&ifindex.to_ne_bytes());
        request.extend_from_slice(&ndmsg);

        append_attribute(&mut request, libc::NDA_DST as u16, &address);
        finalize_length(&mut request);

        NeighborFlushTask { sequence, request }
    }
}

impl RequestTask for NeighborFlushTask {
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
        let endpoint = FakeEndpoint::new(vec![error_message(15, 0)]);
        let mut task = NeighborFlushTask::new(15, 2, [0u8; 16]);
        run_request(&endpoint, &mut task).await.unwrap();
    }
}
