//! In-memory device-state tree mirroring the front end's device
//! hierarchy (spec.md §3). One `FrontEnd` is built at startup and
//! shared (behind `Arc`) between the request dispatcher and the
//! background monitor threads; every field inside it already carries
//! its own `Mutex` or `Shadow`, so no outer lock is needed to read or
//! write a single device's state.

pub mod cartridge;
pub mod cryostat;
pub mod fetim;
pub mod ifswitch;
pub mod lpr;
pub mod mode;
pub mod palimits;
pub mod powerdist;

use std::sync::Mutex;

use femc_abi::ModuleId;
use femc_ringbuf::ErrorLog;

pub use cartridge::{Cartridge, CartridgeBand};
pub use mode::{Mode, ModeCell};
pub use palimits::{PaLimitEntry, PaLimitsTable};

/// Firmware version reported at the version-info special address
/// (spec.md §6).
pub const VERSION: (u8, u8, u8) = (1, 0, 0);

pub struct FrontEnd {
    pub cartridges: Vec<Cartridge>,
    pub power_distribution: powerdist::PowerDistribution,
    pub if_switch: ifswitch::IfSwitch,
    pub cryostat: cryostat::Cryostat,
    pub lpr: lpr::Lpr,
    pub fetim: fetim::Fetim,
    pub mode: ModeCell,
    pub error_log: ErrorLog,
    /// PA-limits tables, one per (cartridge, polarization), loaded from
    /// configuration at startup (spec.md §4.7).
    pub pa_limits: Mutex<Vec<[PaLimitsTable; 2]>>,
}

impl Default for FrontEnd {
    fn default() -> Self {
        let cartridges = cartridge::new_cartridges();
        let pa_limits = cartridges
            .iter()
            .map(|_| [PaLimitsTable::default(), PaLimitsTable::default()])
            .collect();
        Self {
            cartridges,
            power_distribution: powerdist::PowerDistribution::default(),
            if_switch: ifswitch::IfSwitch::default(),
            cryostat: cryostat::Cryostat::default(),
            lpr: lpr::Lpr::default(),
            fetim: fetim::Fetim::default(),
            mode: ModeCell::default(),
            error_log: ErrorLog::default(),
            pa_limits: Mutex::new(pa_limits),
        }
    }
}

impl FrontEnd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cartridge(&self, index: usize) -> Option<&Cartridge> {
        self.cartridges.get(index)
    }

    /// A cartridge is powered iff its power-distribution channel is
    /// enabled (spec.md §3); this is the single source of truth other
    /// modules consult rather than re-deriving "is this cartridge on".
    pub fn cartridge_is_powered(&self, index: usize) -> bool {
        self.power_distribution
            .modules
            .get(index)
            .map(|m| m.is_enabled())
            .unwrap_or(false)
    }

    pub fn record_error(&self, module: ModuleId, error: femc_abi::ErrorKind) {
        self.error_log.store(module, error);
    }
}
