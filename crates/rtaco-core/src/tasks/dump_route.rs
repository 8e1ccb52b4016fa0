use rtaco_wire::events::RouteEvent;
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use super::{append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

/// Size of the fixed `rtmsg` substructure this request carries.
const RTMSG_LEN: usize = 12;

/// Dumps the kernel's full routing table across both address families.
pub struct RouteDumpTask {
    sequence: u32,
    request: Vec<u8>,
    learned: Vec<RouteEvent>,
}

impl RouteDumpTask {
    pub fn new(sequence: u32) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + RTMSG_LEN);
        append_header(
            &mut request,
            libc::RTM_GETROUTE as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_DUMP) as u16,
            sequence,
        );
        request.resize(MessageHeader::LEN + RTMSG_LEN, 0);
        finalize_length(&mut request);

        RouteDumpTask {
            sequence,
            request,
            learned: Vec::new(),
        }
    }
}

impl RequestTask for RouteDumpTask {
    type Output = Vec<RouteEvent>;

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<Vec<RouteEvent>> {
        if header.message_type as i32 != libc::RTM_NEWROUTE {
            return None;
        }
        let event = RouteEvent::parse(header, body);
        if event.action != Action::New {
            return None;
        }
        if event.oif_index != 0 && event.oif_index > u16::MAX as u32 {
            return None;
        }
        self.learned.push(event);
        None
    }

    fn on_terminator(&mut self) -> Result<Vec<RouteEvent>, NlError> {
        Ok(std::mem::take(&mut self.learned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::FakeEndpoint;
    use crate::request::run_request;

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
    async fn empty_dump_returns_empty_list() {
        let endpoint = FakeEndpoint::new(vec![done_message(4)]);
        let mut task = RouteDumpTask::new(4);
        let result = run_request(&endpoint, &mut task).await.unwrap();
        assert!(result.is_empty());
    }
}
