//! Minimal framed TCP wire shape for the bridge listener (SPEC_FULL.md
//! §6, §10): a three-byte header followed by the payload.
//!
//! The header is `[address-high, address-low, class-size-byte]`.
//! `address-high`/`address-low` carry the RCA's module and submodule
//! bits (address bits 0-15); `class-size-byte` carries the two class
//! bits in its top two bits and the payload length (0-8) in its low
//! four bits. This keeps the header self-describing without repeating
//! the class inside the 16-bit address field.

use std::io::{self, Read, Write};

use femc_abi::{Payload, Reply};

const CLASS_BYTE_SHIFT: u8 = 6;

pub struct Frame {
    pub address: u32,
    pub payload: Payload,
}

pub fn read_frame(stream: &mut impl Read) -> io::Result<Frame> {
    let mut header = [0u8; 3];
    stream.read_exact(&mut header)?;
    let [hi, lo, class_size] = header;

    let class = (class_size >> CLASS_BYTE_SHIFT) as u32;
    let len = (class_size & 0x0F) as usize;
    if len > Payload::CAPACITY {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "payload length exceeds 8 bytes"));
    }

    let mut body = [0u8; 8];
    stream.read_exact(&mut body[..len])?;

    let address = (class << femc_abi::address::CLASS_SHIFT) | ((hi as u32) << 8) | lo as u32;
    Ok(Frame {
        address,
        payload: Payload::from_slice(&body[..len]),
    })
}

pub fn write_reply(stream: &mut impl Write, reply: &Reply) -> io::Result<()> {
    stream.write_all(&reply.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_round_trips_class_and_address() {
        let address = (1u32 << femc_abi::address::CLASS_SHIFT) | (3 << 12) | 0x42;
        let class_size = ((1u8) << CLASS_BYTE_SHIFT) | 2;
        let mut bytes = vec![(address >> 8) as u8, address as u8, class_size];
        bytes.extend_from_slice(&[0xAB, 0xCD]);

        let frame = read_frame(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(frame.address, address);
        assert_eq!(frame.payload.as_slice(), &[0xAB, 0xCD]);
    }

    #[test]
    fn oversized_length_is_rejected() {
        let bytes = vec![0u8, 0u8, 0x09];
        assert!(read_frame(&mut Cursor::new(bytes)).is_err());
    }
}
