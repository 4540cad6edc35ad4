//! FETIM: the facility's interlock/compressor/dewar enclosure, present
//! only on installations that have the option (spec.md §4.1, §4.5;
//! grounded on `fetim.h`, `interlockState.h`, `interlockTempSens.h`).

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

pub const INTERLOCK_TEMP_SENSORS_NUMBER: usize = 4;

#[derive(Default)]
pub struct InterlockSensors {
    pub temperature: Mutex<[f32; INTERLOCK_TEMP_SENSORS_NUMBER]>,
    pub flow: Mutex<f32>,
    pub single_fail: Mutex<bool>,
    pub multi_fail: Mutex<bool>,
    pub glitch_counter: Mutex<u32>,
    /// Latched once the interlock has tripped; cleared only by an
    /// explicit control message (spec.md §4.5).
    pub shutdown_trigger: Mutex<bool>,
}

#[derive(Default)]
pub struct Compressor {
    pub he2_pressure: Mutex<f32>,
    pub external_temperature: Mutex<[f32; 2]>,
    pub enable: Mutex<Shadow<bool>>,
    pub fault: Mutex<bool>,
}

#[derive(Default)]
pub struct Dewar {
    pub n2_fill_enable: Mutex<Shadow<bool>>,
}

pub struct Fetim {
    /// Whether this installation has the FETIM option; requests
    /// against an absent FETIM return `HARDW_ERROR` (spec.md §4.3).
    pub available: Mutex<bool>,
    pub hardware_revision: Mutex<u8>,
    pub interlock: InterlockSensors,
    pub compressor: Compressor,
    pub dewar: Dewar,
}

impl Default for Fetim {
    fn default() -> Self {
        Self {
            available: Mutex::new(false),
            hardware_revision: Mutex::new(0),
            interlock: InterlockSensors::default(),
            compressor: Compressor::default(),
            dewar: Dewar::default(),
        }
    }
}
