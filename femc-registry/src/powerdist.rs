//! Power distribution: one enable switch and six voltage/current
//! monitor channels per cartridge slot (spec.md §3, §4.1).
//!
//! A cartridge is considered powered iff its power-distribution channel
//! is enabled; `femc-interlock` and the monitor sweep both read
//! `enable` rather than re-deriving it from any other signal.

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

use crate::cartridge::CARTRIDGES_NUMBER;

pub const VOLTAGE_RAILS_NUMBER: usize = 6;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum VoltageRail {
    Plus6,
    Minus6,
    Plus15,
    Minus15,
    Plus24,
    Plus8,
}

impl VoltageRail {
    pub const ALL: [VoltageRail; VOLTAGE_RAILS_NUMBER] = [
        VoltageRail::Plus6,
        VoltageRail::Minus6,
        VoltageRail::Plus15,
        VoltageRail::Minus15,
        VoltageRail::Plus24,
        VoltageRail::Plus8,
    ];
}

#[derive(Copy, Clone, Default, Debug)]
pub struct PdChannel {
    pub voltage: f32,
    pub current: f32,
}

pub struct PdModule {
    pub enable: Mutex<Shadow<bool>>,
    pub rails: Mutex<[PdChannel; VOLTAGE_RAILS_NUMBER]>,
}

impl Default for PdModule {
    fn default() -> Self {
        Self {
            enable: Mutex::new(Shadow::default()),
            rails: Mutex::new(Default::default()),
        }
    }
}

impl PdModule {
    pub fn is_enabled(&self) -> bool {
        self.enable.lock().unwrap().value().unwrap_or(false)
    }
}

pub struct PowerDistribution {
    pub modules: Vec<PdModule>,
}

impl Default for PowerDistribution {
    fn default() -> Self {
        Self {
            modules: (0..CARTRIDGES_NUMBER).map(|_| PdModule::default()).collect(),
        }
    }
}
