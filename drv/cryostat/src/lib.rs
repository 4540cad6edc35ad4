//! Cryostat bus driver: the 13-sensor temperature readout (9 TVO + 4
//! PRT), the two-sensor vacuum gauge pair, the gate valve, and the
//! backing/turbo pump pair (spec.md §4.2, §4.5; grounded on
//! `cryostatTemp.h`'s TVO/PRT polynomial coefficients and
//! `gateValve.h`/`vacuumController.h`'s state enums).

use femc_abi::ErrorKind;
use femc_bus::Bus;

pub mod sensor;

mod cmd {
    pub const GET_SENSOR_RESISTANCE: u8 = 0x30;
    pub const GET_GATE_VALVE_STATE: u8 = 0x31;
    pub const SET_GATE_VALVE_COMMAND: u8 = 0x32;
    pub const GET_VACUUM_PRESSURE: u8 = 0x33;
    pub const SET_VACUUM_ENABLE: u8 = 0x34;
    pub const GET_VACUUM_STATE: u8 = 0x35;
    pub const SET_PUMP_ENABLE: u8 = 0x36;
    pub const GET_PUMP_STATE: u8 = 0x37;
    pub const GET_SUPPLY_CURRENT: u8 = 0x38;
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GateValveState {
    Unknown,
    Open,
    Closed,
    OverCurrent,
    Error,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PumpKind {
    Backing,
    Turbo,
}

pub trait CryostatDriver: Send + Sync {
    fn read_sensor_resistance(&self, sensor: usize) -> Result<f32, ErrorKind>;
    fn read_gate_valve_state(&self) -> Result<GateValveState, ErrorKind>;
    fn set_gate_valve_command(&self, open: bool) -> Result<(), ErrorKind>;
    fn read_vacuum_pressure(&self, gauge: usize) -> Result<f32, ErrorKind>;
    fn set_vacuum_enable(&self, enable: bool) -> Result<(), ErrorKind>;
    fn read_vacuum_state(&self) -> Result<bool, ErrorKind>;
    fn set_pump_enable(&self, pump: PumpKind, enable: bool) -> Result<(), ErrorKind>;
    fn read_pump_state(&self, pump: PumpKind) -> Result<bool, ErrorKind>;
    fn read_supply_current_110v(&self) -> Result<f32, ErrorKind>;
}

pub struct HardwareCryostat {
    bus: Bus,
}

impl HardwareCryostat {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

impl CryostatDriver for HardwareCryostat {
    fn read_sensor_resistance(&self, sensor: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_SENSOR_RESISTANCE, 2, sensor as u32)?;
        Ok(data as f32 / sensor::RESISTANCE_COUNT_SCALE)
    }

    fn read_gate_valve_state(&self) -> Result<GateValveState, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_GATE_VALVE_STATE, 1, 0)?;
        Ok(match data {
            0 => GateValveState::Open,
            1 => GateValveState::Closed,
            2 => GateValveState::OverCurrent,
            3 => GateValveState::Error,
            _ => GateValveState::Unknown,
        })
    }

    fn set_gate_valve_command(&self, open: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_GATE_VALVE_COMMAND, 1, open as u32)?;
        Ok(())
    }

    fn read_vacuum_pressure(&self, gauge: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_VACUUM_PRESSURE, 2, gauge as u32)?;
        Ok(data as f32 / 1000.0)
    }

    fn set_vacuum_enable(&self, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_VACUUM_ENABLE, 1, enable as u32)?;
        Ok(())
    }

    fn read_vacuum_state(&self) -> Result<bool, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_VACUUM_STATE, 1, 0)?;
        Ok(data != 0)
    }

    fn set_pump_enable(&self, pump: PumpKind, enable: bool) -> Result<(), ErrorKind> {
        let which = matches!(pump, PumpKind::Turbo) as u32;
        self.transact(cmd::SET_PUMP_ENABLE, 1, which << 8 | enable as u32)?;
        Ok(())
    }

    fn read_pump_state(&self, pump: PumpKind) -> Result<bool, ErrorKind> {
        let which = matches!(pump, PumpKind::Turbo) as u32;
        let (_, data) = self.transact(cmd::GET_PUMP_STATE, 1, which << 8)?;
        Ok(data != 0)
    }

    fn read_supply_current_110v(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_SUPPLY_CURRENT, 2, 0)?;
        Ok(data as f32 / 100.0)
    }
}

/// Simulation backend: every sensor reads out at a fixed, cryostat-cold
/// resistance; every state reports nominal.
#[derive(Default)]
pub struct SimulatedCryostat;

impl CryostatDriver for SimulatedCryostat {
    fn read_sensor_resistance(&self, _sensor: usize) -> Result<f32, ErrorKind> {
        Ok(100.0)
    }
    fn read_gate_valve_state(&self) -> Result<GateValveState, ErrorKind> {
        Ok(GateValveState::Closed)
    }
    fn set_gate_valve_command(&self, _open: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_vacuum_pressure(&self, _gauge: usize) -> Result<f32, ErrorKind> {
        Ok(1e-6)
    }
    fn set_vacuum_enable(&self, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_vacuum_state(&self) -> Result<bool, ErrorKind> {
        Ok(true)
    }
    fn set_pump_enable(&self, _pump: PumpKind, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_pump_state(&self, _pump: PumpKind) -> Result<bool, ErrorKind> {
        Ok(true)
    }
    fn read_supply_current_110v(&self) -> Result<f32, ErrorKind> {
        Ok(1.5)
    }
}
