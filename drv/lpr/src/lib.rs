//! LPR/EDFA bus driver (spec.md §4.1; grounded on `edfa.h`/`laser.h`).

use femc_abi::ErrorKind;
use femc_bus::Bus;

mod cmd {
    pub const GET_PUMP_CURRENT: u8 = 0x60;
    pub const SET_DRIVE_CURRENT: u8 = 0x61;
    pub const GET_PHOTODETECTOR_CURRENT: u8 = 0x62;
    pub const GET_PHOTODETECTOR_POWER: u8 = 0x63;
    pub const SET_MODULATION_INPUT: u8 = 0x64;
    pub const GET_DRIVER_TEMP_ALARM: u8 = 0x65;
}

pub trait LprDriver: Send + Sync {
    fn read_pump_current(&self) -> Result<f32, ErrorKind>;
    fn set_drive_current(&self, milliamps: f32) -> Result<(), ErrorKind>;
    fn read_photo_detector_current(&self) -> Result<f32, ErrorKind>;
    fn read_photo_detector_power(&self) -> Result<f32, ErrorKind>;
    fn set_modulation_input(&self, value: f32) -> Result<(), ErrorKind>;
    fn read_driver_temperature_alarm(&self) -> Result<bool, ErrorKind>;
}

pub struct HardwareLpr {
    bus: Bus,
}

impl HardwareLpr {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

impl LprDriver for HardwareLpr {
    fn read_pump_current(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PUMP_CURRENT, 2, 0)?;
        Ok(data as f32 / 100.0)
    }

    fn set_drive_current(&self, milliamps: f32) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_DRIVE_CURRENT, 2, (milliamps * 100.0) as u32)?;
        Ok(())
    }

    fn read_photo_detector_current(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PHOTODETECTOR_CURRENT, 2, 0)?;
        Ok(data as f32 / 100.0)
    }

    fn read_photo_detector_power(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PHOTODETECTOR_POWER, 2, 0)?;
        Ok(data as f32 / 100.0)
    }

    fn set_modulation_input(&self, value: f32) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_MODULATION_INPUT, 2, (value * 1000.0) as u32)?;
        Ok(())
    }

    fn read_driver_temperature_alarm(&self) -> Result<bool, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_DRIVER_TEMP_ALARM, 1, 0)?;
        Ok(data != 0)
    }
}

#[derive(Default)]
pub struct SimulatedLpr;

impl LprDriver for SimulatedLpr {
    fn read_pump_current(&self) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_drive_current(&self, _milliamps: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_photo_detector_current(&self) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn read_photo_detector_power(&self) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_modulation_input(&self, _value: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_driver_temperature_alarm(&self) -> Result<bool, ErrorKind> {
        Ok(false)
    }
}
