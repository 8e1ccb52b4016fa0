use rtaco_wire::events::LinkEvent;
use rtaco_wire::header::MessageHeader;
use rtaco_wire::Action;

use super::{append_header, finalize_length};
use crate::error::NlError;
use crate::request::RequestTask;

/// Size of the fixed `ifinfomsg` substructure this request carries.
const IFINFOMSG_LEN: usize = 16;

/// Dumps every network interface the kernel currently knows about.
pub struct LinkDumpTask {
    sequence: u32,
    request: Vec<u8>,
    learned: Vec<LinkEvent>,
}

impl LinkDumpTask {
    pub fn new(sequence: u32) -> Self {
        let mut request = Vec::with_capacity(MessageHeader::LEN + IFINFOMSG_LEN);
        append_header(
            &mut request,
            libc::RTM_GETLINK as u16,
            (libc::NLM_F_REQUEST | libc::NLM_F_DUMP) as u16,
            sequence,
        );
        // Wildcard family and index: an all-zero ifinfomsg.
        request.resize(MessageHeader::LEN + IFINFOMSG_LEN, 0);
        finalize_length(&mut request);

        LinkDumpTask {
            sequence,
            request,
            learned: Vec::new(),
        }
    }
}

impl RequestTask for LinkDumpTask {
    type Output = Vec<LinkEvent>;

    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn request_message(&self) -> &[u8] {
        &self.request
    }

    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<Vec<LinkEvent>> {
        if header.message_type as i32 != libc::RTM_NEWLINK {
            return None;
        }
        let event = LinkEvent::parse(header, body);
        if event.action != Action::New {
            return None;
        }
        if event.index <= 0 || event.index > u16::MAX as i32 {
            return None;
        }
        self.learned.push(event);
        None
    }

    fn on_terminator(&mut self) -> Result<Vec<LinkEvent>, NlError> {
        Ok(std::mem::take(&mut self.learned))
    }
}
