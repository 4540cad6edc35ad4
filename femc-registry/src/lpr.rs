//! LPR (laser pump / EDFA) subsystem: laser, photodetector, and
//! modulation-input submodules (spec.md §4.1; grounded on `edfa.h` and
//! `laser.h`).

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

#[derive(Default)]
pub struct Laser {
    pub pump_current: Mutex<f32>,
    pub drive_current: Mutex<Shadow<f32>>,
    pub photo_detector_current: Mutex<f32>,
}

#[derive(Default)]
pub struct PhotoDetector {
    pub power: Mutex<f32>,
    pub current: Mutex<f32>,
}

#[derive(Default)]
pub struct ModulationInput {
    pub value: Mutex<Shadow<f32>>,
}

pub struct Lpr {
    pub laser: Laser,
    pub photo_detector: PhotoDetector,
    pub modulation_input: ModulationInput,
    pub edfa_driver_temperature_alarm: Mutex<bool>,
}

impl Default for Lpr {
    fn default() -> Self {
        Self {
            laser: Laser::default(),
            photo_detector: PhotoDetector::default(),
            modulation_input: ModulationInput::default(),
            edfa_driver_temperature_alarm: Mutex::new(false),
        }
    }
}
