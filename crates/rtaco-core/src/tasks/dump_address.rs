use rtaco_wire::events::AddressEvent;
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use super::{append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

/// Size of the fixed `ifaddrmsg` substructure this request carries.
const IFADDRMSG_LEN: usize = 8;

/// Dumps every address assigned across all interfaces and both address
/// families.
pub struct AddressDumpTask {
    sequence: u32,
    request: Vec<u8>,
    learned: Vec<AddressEvent>,
}

impl AddressDumpTask {
    pub fn new(sequence: u32) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + IFADDRMSG_LEN);
        append_header(
            &mut request,
            libc::RTM_GETADDR as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_DUMP) as u16,
            sequence,
        );
        request.resize(MessageHeader::LEN + IFADDRMSG_LEN, 0);
        finalize_length(&mut request);

        AddressDumpTask {
            sequence,
            request,
            learned: Vec::new(),
        }
    }
}

impl RequestTask for AddressDumpTask {
    type Output = Vec<AddressEvent>;

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<Vec<AddressEvent>> {
        if header.message_type as i32 != libc::RTM_NEWADDR {
            return None;
        }
        let event = AddressEvent::parse(header, body);
        if event.action != Action::New {
            return None;
        }
        if event.index <= 0 || event.index > u16::MAX as i32 {
            return None;
        }
        self.learned.push(event);
        None
    }

    fn on_terminator(&mut self) -> Result<Vec<AddressEvent>, NlError> {
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
        let endpoint = FakeEndpoint::new(vec![done_message(11)]);
        let mut task = AddressDumpTask::new(11);
        let result = run_request(&endpoint, &mut task).await.unwrap();
        assert!(result.is_empty());
    }
}
