//! The fixed 16-byte message header shared by every netlink message.

/// `nlmsghdr`: length, type, flags, sequence, and port-id, all host byte
/// order on the platforms this crate targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub length: u32,
    pub message_type: u16,
    pub flags: u16,
    pub sequence: u32,
    pub port_id: u32,
}

impl MessageHeader {
    /// Size of the fixed header prefix in bytes.
    pub const LEN: usize = 16;

    /// Parse a header from the front of `bytes`. Returns `None` if fewer
    /// than [`Self::LEN`] bytes are available.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::LEN {
            return None;
        }

        Some(Self {
            length: u32::from_ne_bytes(bytes[0..4].try_into().ok()?),
            message_type: u16::from_ne_bytes(bytes[4..6].try_into().ok()?),
            flags: u16::from_ne_bytes(bytes[6..8].try_into().ok()?),
            sequence: u32::from_ne_bytes(bytes[8..12].try_into().ok()?),
            port_id: u32::from_ne_bytes(bytes[12..16].try_into().ok()?),
        })
    }

    /// Serialize the header into the front of `out`, which must be at least
    /// [`Self::LEN`] bytes long.
    pub fn write_into(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.length.to_ne_bytes());
        out[4..6].copy_from_slice(&self.message_type.to_ne_bytes());
        out[6..8].copy_from_slice(&self.flags.to_ne_bytes());
        out[8..12].copy_from_slice(&self.sequence.to_ne_bytes());
        out[12..16].copy_from_slice(&self.port_id.to_ne_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_write_and_parse() {
        let header = MessageHeader {
            length: 32,
            message_type: libc::RTM_NEWROUTE as u16,
            flags: (libc::NLM_F_REQUEST | libc::NLM_F_DUMP) as u16,
            sequence: 42,
            port_id: 0,
        };

        let mut buf = [0u8; MessageHeader::LEN];
        header.write_into(&mut buf);
        assert_eq!(MessageHeader::parse(&buf), Some(header));
    }

    #[test]
    fn parse_rejects_short_buffers() {
        assert_eq!(MessageHeader::parse(&[0u8; 8]), None);
    }
}
