//! Typed, volatile accessor over one memory-mapped SSC register block.
//!
//! The mapping is acquired once at init and held for the life of the
//! process (spec.md §5). We intentionally go through `read_volatile`/
//! `write_volatile` on every access rather than a `&mut` reference to
//! the block, so the compiler cannot reorder or elide register writes
//! (spec.md §9 design notes).

use std::ffi::c_void;
use std::time::{Duration, Instant};

use crate::error::BusError;
use crate::regs::{offset, RD_SSC, STATUS_BUSY_BIT, WR_SSC};
use crate::transport::BusBackend;

/// How long a busy-bit poll is allowed to run before we declare a
/// timeout (spec.md §5: "the serial-busy poll spins until either the
/// bus reports done or a deadline elapses").
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

pub struct HardwareBus {
    base: *mut u32,
    #[allow(dead_code)]
    map_len: usize,
}

// Safety: all access to `base` goes through `transact`, which is only
// ever called with the bus's mutex held (see `Bus::transact`).
unsafe impl Send for HardwareBus {}

impl HardwareBus {
    /// Maps `offset::BLOCK_WORDS` 32-bit words starting at `phys_base`
    /// out of `/dev/mem`. Returns `BusError::MapFailed` if the mapping
    /// cannot be established.
    pub fn open(phys_base: u64) -> Result<Self, BusError> {
        let map_len = offset::BLOCK_WORDS * std::mem::size_of::<u32>();
        let fd = unsafe {
            libc::open(
                b"/dev/mem\0".as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_SYNC,
            )
        };
        if fd < 0 {
            return Err(BusError::MapFailed);
        }
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                phys_base as libc::off_t,
            )
        };
        unsafe {
            libc::close(fd);
        }
        if addr == libc::MAP_FAILED {
            return Err(BusError::MapFailed);
        }
        Ok(Self {
            base: addr as *mut u32,
            map_len,
        })
    }

    fn write_word(&self, word_offset: usize, value: u32) {
        unsafe {
            std::ptr::write_volatile(self.base.add(word_offset), value);
        }
    }

    fn read_word(&self, word_offset: usize) -> u32 {
        unsafe { std::ptr::read_volatile(self.base.add(word_offset)) }
    }

    fn poll_until_idle(&self) -> Result<(), BusError> {
        let deadline = Instant::now() + POLL_TIMEOUT;
        loop {
            let status = self.read_word(offset::STATUS);
            if status & STATUS_BUSY_BIT == 0 {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BusError::Timeout);
            }
            std::hint::spin_loop();
        }
    }
}

impl BusBackend for HardwareBus {
    fn transact(
        &mut self,
        command: u8,
        length: u8,
        data: u32,
    ) -> Result<(u32, u32), BusError> {
        self.write_word(offset::DATAWR, data);
        self.write_word(offset::LENGTH, length as u32);
        self.write_word(offset::COMMAND, command as u32);
        self.write_word(offset::STATUS, WR_SSC);
        self.poll_until_idle()?;

        self.write_word(offset::STATUS, RD_SSC);
        self.poll_until_idle()?;

        Ok((self.read_word(offset::DATARD0), self.read_word(offset::DATARD1)))
    }
}
