//! Generic request/reply state machine: send one prepared request, then
//! consume reply datagrams from the shared channel until the concrete
//! task signals completion, matching only messages whose sequence equals
//! the request's.

use rtaco_wire::align::walk_messages;
use rtaco_wire::header::MessageHeader;

use crate::endpoint::{DatagramEndpoint, REQUEST_BUFFER_SIZE};
use crate::error::NlError;

/// What a concrete request composes and how it reacts to replies.
///
/// Implementors are single-use: built at the call site, driven once by
/// [`run_request`], then dropped.
pub trait RequestTask: Send {
    /// What a successful completion yields.
    type Output;

    /// The sequence number this task expects echoed back by the kernel.
    fn sequence(&self) -> u32;

    /// The fully-framed request datagram to send.
    fn request_message(&self) -> &[u8];

    /// Handle one reply message already known to match this task's
    /// sequence. Returning `Some` ends the task immediately with that
    /// result; returning `None` keeps the receive loop running (typically
    /// because the message was accumulated into internal state).
    fn on_message(&mut self, header: &MessageHeader, body: &[u8]) -> Option<Self::Output>;

    /// Called when the reply stream ends (a `NLMSG_DONE` terminator, or a
    /// positive acknowledgement with error code 0). Dump tasks return
    /// their accumulated list here; tasks expecting an explicit match
    /// (neighbor get) that have not seen one yet return `NotFound`.
    fn on_terminator(&mut self) -> Result<Self::Output, NlError>;
}

/// Drive `task` to completion against `endpoint`: send its request, then
/// read datagrams until the task's sequence is acknowledged, errored, or
/// terminated.
pub async fn run_request<E, T>(endpoint: &E, task: &mut T) -> Result<T::Output, NlError>
where
    E: DatagramEndpoint,
    T: RequestTask,
{
    send_all(endpoint, task.request_message()).await?;

    let mut buf = vec![0u8; REQUEST_BUFFER_SIZE];
    loop {
        let n = endpoint.recv(&mut buf).await?;
        if n == 0 {
            continue;
        }

        for (header, body) in walk_messages(&buf[..n]) {
            if header.sequence != task.sequence() {
                continue;
            }

            match header.message_type as i32 {
                libc::NLMSG_DONE => return task.on_terminator(),
                libc::NLMSG_ERROR => {
                    if body.len() < 4 {
                        log::warn!("error message too short to carry an error code");
                        continue;
                    }
                    let code = i32::from_ne_bytes(body[0..4].try_into().expect("4 bytes"));
                    if code == 0 {
                        return task.on_terminator();
                    }
                    return Err(NlError::from_kernel_code(code));
                }
                libc::NLMSG_NOOP | libc::NLMSG_OVERRUN => continue,
                _ => {
                    if let Some(output) = task.on_message(&header, body) {
                        return Ok(output);
                    }
                }
            }
        }
    }
}

async fn send_all<E: DatagramEndpoint>(endpoint: &E, message: &[u8]) -> Result<(), NlError> {
    let mut offset = 0;
    while offset < message.len() {
        let sent = endpoint.send(&message[offset..]).await?;
        if sent == 0 {
            return Err(NlError::Io(std::io::Error::from(
                std::io::ErrorKind::WriteZero,
            )));
        }
        offset += sent;
    }
    Ok(())
}
