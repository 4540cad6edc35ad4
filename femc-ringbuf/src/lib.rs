//! Bounded ring buffers.
//!
//! Two uses in this system: the error log (spec.md §4.6), a ring of
//! `(module, error code)` pairs drained one entry at a time through
//! special addresses; and general driver/monitor diagnostic traces,
//! which use the same underlying buffer but are never drained over the
//! wire. Modeled on `oxidecomputer-hubris`'s `lib/ringbuf` (the sibling
//! Hubris-family repo's own ring buffer was not present in our copy of
//! the teacher), simplified for a hosted, std target: entries live
//! behind a `Mutex` rather than in a static, and there is no Humility
//! inspection support to carry over.

use std::sync::Mutex;

use femc_abi::{ErrorKind, ModuleId};

/// A fixed-capacity circular buffer. Pushing past capacity silently
/// drops the oldest entry, mirroring spec.md §4.6's overflow behavior.
pub struct RingBuf<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
}

struct Inner<T> {
    slots: Vec<Option<T>>,
    /// Index of the next slot to write (the position just past the
    /// newest entry).
    newest: usize,
    /// Index of the oldest unread entry.
    oldest: usize,
    len: usize,
}

impl<T: Clone> RingBuf<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be nonzero");
        Self {
            inner: Mutex::new(Inner {
                slots: vec![None; capacity],
                newest: 0,
                oldest: 0,
                len: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an entry, dropping the oldest one if the buffer is full.
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock().unwrap();
        let newest = inner.newest;
        inner.slots[newest] = Some(item);
        inner.newest = (inner.newest + 1) % self.capacity;
        if inner.len == self.capacity {
            // Full: the write above just overwrote the oldest slot, so
            // the new oldest is one further along.
            inner.oldest = (inner.oldest + 1) % self.capacity;
        } else {
            inner.len += 1;
        }
    }

    /// Number of unread entries, `(newest - oldest) mod capacity`.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pops the single oldest unread entry, if any.
    pub fn pop_oldest(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        if inner.len == 0 {
            return None;
        }
        let oldest = inner.oldest;
        let item = inner.slots[oldest].take();
        inner.oldest = (inner.oldest + 1) % self.capacity;
        inner.len -= 1;
        item
    }
}

/// Default capacity for the error log, chosen to comfortably hold a
/// burst of faults from an interlock sweep without growing unbounded.
pub const ERROR_LOG_CAPACITY: usize = 64;

/// Sentinel returned by the "next error" special address when the log
/// is empty (spec.md §6).
pub const NO_MORE_ERRORS: u16 = 0xFFFF;

/// The bounded `(module, error code)` ring described in spec.md §4.6.
pub struct ErrorLog {
    ring: RingBuf<(ModuleId, ErrorKind)>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::with_capacity(ERROR_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: RingBuf::new(capacity),
        }
    }

    pub fn store(&self, module: ModuleId, error: ErrorKind) {
        self.ring.push((module, error));
    }

    pub fn unread_count(&self) -> usize {
        self.ring.len()
    }

    /// Pops the oldest entry, encoded as a 16-bit value for the special
    /// "next error" address, or `NO_MORE_ERRORS` when the log is empty.
    pub fn next_error_code(&self) -> u16 {
        match self.ring.pop_oldest() {
            Some((module, error)) => encode_error(module, error),
            None => NO_MORE_ERRORS,
        }
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_error(module: ModuleId, error: ErrorKind) -> u16 {
    let module_code = match module {
        ModuleId::Cartridge(n) => 0x00 + n as u16,
        ModuleId::Lo(n) => 0x10 + n as u16,
        ModuleId::Bias(n) => 0x20 + n as u16,
        ModuleId::PowerDistribution => 0x30,
        ModuleId::IfSwitch => 0x31,
        ModuleId::Cryostat => 0x32,
        ModuleId::GateValve => 0x33,
        ModuleId::Lpr => 0x34,
        ModuleId::Fetim => 0x35,
        ModuleId::Interlock => 0x36,
        ModuleId::Router => 0x37,
    };
    let error_code = error as u16;
    (module_code << 8) | error_code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_drops_oldest_and_keeps_insertion_order() {
        let log = ErrorLog::with_capacity(2);
        log.store(ModuleId::Cryostat, ErrorKind::HardwareTimeout);
        log.store(ModuleId::Lo(0), ErrorKind::CommandVal);
        log.store(ModuleId::Fetim, ErrorKind::HardwareBlocked);
        // capacity 2: the Cryostat entry (inserted first) was dropped
        assert_eq!(log.unread_count(), 2);
        let first = log.next_error_code();
        let second = log.next_error_code();
        assert_eq!(first, encode_error(ModuleId::Lo(0), ErrorKind::CommandVal));
        assert_eq!(
            second,
            encode_error(ModuleId::Fetim, ErrorKind::HardwareBlocked)
        );
    }

    #[test]
    fn draining_empty_log_returns_sentinel() {
        let log = ErrorLog::new();
        assert_eq!(log.next_error_code(), NO_MORE_ERRORS);
        assert_eq!(log.next_error_code(), NO_MORE_ERRORS);
    }

    #[test]
    fn wraparound_fills_to_capacity_then_drops_oldest() {
        let log = ErrorLog::with_capacity(3);
        for i in 0..4u8 {
            log.store(ModuleId::Lo(i), ErrorKind::ModuleRange);
        }
        assert_eq!(log.unread_count(), 3);
        assert_eq!(
            log.next_error_code(),
            encode_error(ModuleId::Lo(1), ErrorKind::ModuleRange)
        );
    }
}
