//! Cryostat: 13 temperature sensors (TVO/PRT), vacuum system, and the
//! backing/turbo pump pair (spec.md §4.2, §4.5).

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

pub const TEMP_SENSORS_NUMBER: usize = 13;
pub const TVO_SENSORS_NUMBER: usize = 9;
pub const TVO_COEFFS_NUMBER: usize = 7;
pub const VACUUM_SENSORS_NUMBER: usize = 2;

/// Whether a given sensor index is read out with the TVO polynomial or
/// the PRT dual-curve interpolation (spec.md §4.2; `cryostatTemp.h`
/// indices 0-8 are TVO, 9-12 are PRT).
pub fn is_tvo_sensor(index: usize) -> bool {
    index < TVO_SENSORS_NUMBER
}

#[derive(Clone, Debug)]
pub struct TempSensor {
    pub temperature: f32,
    /// TVO sensors carry their own interpolation coefficients,
    /// read out one at a time by the monitor sweep and settable only
    /// in maintenance mode.
    pub tvo_coeff: [f32; TVO_COEFFS_NUMBER],
    pub next_coeff: Shadow<u8>,
}

impl Default for TempSensor {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            tvo_coeff: [0.0; TVO_COEFFS_NUMBER],
            next_coeff: Shadow::default(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum GateValveState {
    #[default]
    Unknown,
    Open,
    Closed,
    OverCurrent,
    Error,
}

#[derive(Default)]
pub struct GateValve {
    pub state: Mutex<GateValveState>,
    pub command: Mutex<Shadow<bool>>,
}

#[derive(Default)]
pub struct VacuumController {
    pub pressure: Mutex<[f32; VACUUM_SENSORS_NUMBER]>,
    pub enable: Mutex<Shadow<bool>>,
    pub state: Mutex<bool>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum PumpState {
    #[default]
    Off,
    On,
    Error,
}

#[derive(Default)]
pub struct Pump {
    pub enable: Mutex<Shadow<bool>>,
    pub state: Mutex<PumpState>,
}

pub struct Cryostat {
    pub temperature: Mutex<[TempSensor; TEMP_SENSORS_NUMBER]>,
    pub gate_valve: GateValve,
    pub vacuum: VacuumController,
    pub backing_pump: Pump,
    pub turbo_pump: Pump,
    pub supply_current_110v: Mutex<f32>,
    /// Hardware revision affects the TVO gain factor used during the
    /// monitor sweep (`TVO_GAIN_REV0` vs `TVO_GAIN_REV1`).
    pub hardware_revision: Mutex<u8>,
}

impl Default for Cryostat {
    fn default() -> Self {
        Self {
            temperature: Mutex::new(Default::default()),
            gate_valve: GateValve::default(),
            vacuum: VacuumController::default(),
            backing_pump: Pump::default(),
            turbo_pump: Pump::default(),
            supply_current_110v: Mutex::new(0.0),
            hardware_revision: Mutex::new(0),
        }
    }
}
