//! Explicit big-endian wire encoders (spec.md §4.4, §6, §9 design notes).
//!
//! The wire is network order for every multi-byte numeric. Booleans and
//! bytes are single bytes. We never rely on `memcpy`-style transmutes;
//! every encode/decode goes through `byteorder` so the compiler catches
//! an endianness mismatch as a type error rather than a silent bug.

use byteorder::{BigEndian, ByteOrder};

/// A payload of 0 to 8 bytes, the unit every leaf handler trades in.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Payload {
    bytes: [u8; 8],
    len: u8,
}

impl Payload {
    pub const CAPACITY: usize = 8;

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_slice(data: &[u8]) -> Self {
        assert!(data.len() <= Self::CAPACITY, "payload exceeds 8 bytes");
        let mut bytes = [0u8; 8];
        bytes[..data.len()].copy_from_slice(data);
        Self {
            bytes,
            len: data.len() as u8,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn u16_be(value: u16) -> Self {
        let mut bytes = [0u8; 8];
        BigEndian::write_u16(&mut bytes[..2], value);
        Self { bytes, len: 2 }
    }

    pub fn as_u16_be(&self) -> Option<u16> {
        if self.len() == 2 {
            Some(BigEndian::read_u16(&self.bytes[..2]))
        } else {
            None
        }
    }

    pub fn f32_be(value: f32) -> Self {
        let mut bytes = [0u8; 8];
        BigEndian::write_f32(&mut bytes[..4], value);
        Self { bytes, len: 4 }
    }

    pub fn as_f32_be(&self) -> Option<f32> {
        if self.len() == 4 {
            Some(BigEndian::read_f32(&self.bytes[..4]))
        } else {
            None
        }
    }

    pub fn byte(value: u8) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = value;
        Self { bytes, len: 1 }
    }

    pub fn as_byte(&self) -> Option<u8> {
        if self.len() == 1 {
            Some(self.bytes[0])
        } else {
            None
        }
    }

    pub fn bool(value: bool) -> Self {
        Self::byte(value as u8)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_byte().map(|b| b != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f32_round_trips_bit_exact() {
        let value = 12.375_f32;
        let payload = Payload::f32_be(value);
        assert_eq!(payload.as_f32_be(), Some(value));
    }

    #[test]
    fn u16_big_endian_on_wire() {
        let payload = Payload::u16_be(0x0FFF);
        assert_eq!(payload.as_slice(), &[0x0F, 0xFF]);
    }
}
