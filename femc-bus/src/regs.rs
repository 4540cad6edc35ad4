//! Register layout for one synchronous-serial controller (SSC) port
//! (spec.md §6). Offsets are relative to a per-bus base address; the
//! STATUS busy bit and the two command words are shared by every port.

/// Offsets, in 32-bit words, from the bus's base address.
pub mod offset {
    pub const DATAWR: usize = 0;
    pub const DATARD0: usize = 1;
    pub const DATARD1: usize = 2;
    pub const LENGTH: usize = 3;
    pub const COMMAND: usize = 4;
    pub const STATUS: usize = 5;

    /// Number of 32-bit words spanned by one SSC port's register block.
    pub const BLOCK_WORDS: usize = 6;
}

/// `STATUS` bit 2 is the busy flag (spec.md §6).
pub const STATUS_BUSY_BIT: u32 = 1 << 2;

/// Command words that initiate a transaction when written to `STATUS`.
pub const WR_SSC: u32 = 0x1;
pub const RD_SSC: u32 = 0x2;
