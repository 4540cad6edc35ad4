//! The request/reply shapes that cross the wire (spec.md §6).

use crate::address::Class;
use crate::status::Status;
use crate::wire::Payload;

/// An inbound request: `(address, class, payload)` (spec.md §4.1).
#[derive(Copy, Clone, Debug)]
pub struct Request {
    pub address: u32,
    pub class: Class,
    pub payload: Payload,
}

impl Request {
    pub fn new(address: u32, class: Class, payload: Payload) -> Self {
        Self {
            address,
            class,
            payload,
        }
    }

    /// Payload size == 0 and not a control RCA: monitor-on-monitor-RCA.
    pub fn is_monitor_on_monitor(&self) -> bool {
        self.payload.is_empty() && !self.class.is_control_rca()
    }

    /// Payload size > 0 and class bit 0 == 1: control write.
    pub fn is_control_write(&self) -> bool {
        !self.payload.is_empty() && self.class.is_control_rca()
    }

    /// Payload size == 0 and class bit 0 == 1: monitor-on-control-RCA.
    pub fn is_monitor_on_control(&self) -> bool {
        self.payload.is_empty() && self.class.is_control_rca()
    }

    /// Payload size > 0 on a monitor-only address.
    pub fn is_oversized_monitor(&self) -> bool {
        !self.payload.is_empty() && !self.class.is_control_rca()
    }
}

/// A reply: payload, plus a trailing status byte iff the payload is
/// shorter than 8 bytes (spec.md §4.1, §6). `None` means no reply is
/// produced at all (e.g. a successful control write with a full 8-byte
/// payload, or a request that was silently dropped per spec.md §4.1's
/// oversized-monitor case).
#[derive(Copy, Clone, Debug)]
pub struct Reply {
    pub payload: Payload,
    pub status: Status,
}

impl Reply {
    pub fn new(payload: Payload, status: Status) -> Self {
        Self { payload, status }
    }

    /// Encodes the reply as it appears on the wire: payload bytes, then
    /// a trailing status byte iff `payload.len() < 8`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.payload.as_slice().to_vec();
        if self.payload.len() < Payload::CAPACITY {
            out.push(self.status.to_byte());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_has_no_trailing_status() {
        let reply = Reply::new(Payload::from_slice(&[0u8; 8]), Status::NoError);
        assert_eq!(reply.encode().len(), 8);
    }

    #[test]
    fn short_payload_gets_trailing_status() {
        let reply = Reply::new(Payload::u16_be(5), Status::NoError);
        let encoded = reply.encode();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded[2], Status::NoError.to_byte());
    }
}
