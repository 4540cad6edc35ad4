//! Reply status byte (spec.md §6) and the internal error-kind taxonomy
//! (spec.md §7). `Status` is a wire value attached to every reply;
//! `ErrorKind` is what gets recorded into the error log (spec.md §4.6).

/// The trailing status byte appended to a reply when the payload is
/// shorter than 8 bytes.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[repr(u8)]
pub enum Status {
    #[default]
    NoError = 0,
    Error = 1,
    HardwBlkdErr = 2,
    HardwRngErr = 3,
    MonCanRng = 4,
    ConErrorRng = 5,
}

impl Status {
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Error kinds stored in the bounded error ring (spec.md §4.6, §7).
/// Drivers never store these themselves; the leaf handler that receives
/// a driver's `Result` does, pairing it with the module that raised it.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("submodule index out of range")]
    ModuleRange,
    #[error("operation not allowed at this address")]
    RcaRange,
    #[error("payload outside valid domain")]
    CommandVal,
    #[error("front end is in maintenance mode")]
    MaintMode,
    #[error("serial bus or subsystem did not finish in time")]
    HardwareTimeout,
    #[error("software-side refusal")]
    HardwareBlocked,
    #[error("addressed cartridge is not powered")]
    ModulePower,
}

impl ErrorKind {
    /// The status a reply should carry when this error kind is the reason
    /// a request could not be completed.
    pub fn as_status(self) -> Status {
        match self {
            ErrorKind::ModuleRange => Status::HardwRngErr,
            ErrorKind::RcaRange => Status::MonCanRng,
            ErrorKind::CommandVal => Status::ConErrorRng,
            ErrorKind::MaintMode => Status::HardwBlkdErr,
            ErrorKind::HardwareTimeout => Status::Error,
            ErrorKind::HardwareBlocked => Status::HardwBlkdErr,
            ErrorKind::ModulePower => Status::HardwBlkdErr,
        }
    }
}

/// Identifies which module logged an `ErrorKind`, for the error ring
/// (spec.md §4.6). Kept intentionally small and `Copy`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ModuleId {
    Cartridge(u8),
    Lo(u8),
    Bias(u8),
    PowerDistribution,
    IfSwitch,
    Cryostat,
    GateValve,
    Lpr,
    Fetim,
    Interlock,
    Router,
}
