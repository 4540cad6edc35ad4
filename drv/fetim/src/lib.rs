//! FETIM bus driver: interlock sensors, compressor, dewar fill valve
//! (spec.md §4.1, §4.5; grounded on `fetim.h`, `interlockState.h`,
//! `interlockTempSens.h`).

use femc_abi::ErrorKind;
use femc_bus::Bus;

mod cmd {
    pub const GET_INTERLOCK_TEMP: u8 = 0x70;
    pub const GET_INTERLOCK_FLOW: u8 = 0x71;
    pub const GET_INTERLOCK_FAULTS: u8 = 0x72;
    pub const SET_COMPRESSOR_ENABLE: u8 = 0x73;
    pub const GET_COMPRESSOR_FAULT: u8 = 0x74;
    pub const GET_HE2_PRESSURE: u8 = 0x75;
    pub const GET_EXTERNAL_TEMP: u8 = 0x76;
    pub const SET_N2_FILL_ENABLE: u8 = 0x77;
}

pub trait FetimDriver: Send + Sync {
    fn read_interlock_temperature(&self, sensor: usize) -> Result<f32, ErrorKind>;
    fn read_interlock_flow(&self) -> Result<f32, ErrorKind>;
    /// Returns `(single_fail, multi_fail)`.
    fn read_interlock_faults(&self) -> Result<(bool, bool), ErrorKind>;
    fn set_compressor_enable(&self, enable: bool) -> Result<(), ErrorKind>;
    fn read_compressor_fault(&self) -> Result<bool, ErrorKind>;
    fn read_he2_pressure(&self) -> Result<f32, ErrorKind>;
    fn read_external_temperature(&self, sensor: usize) -> Result<f32, ErrorKind>;
    fn set_n2_fill_enable(&self, enable: bool) -> Result<(), ErrorKind>;
}

pub struct HardwareFetim {
    bus: Bus,
}

impl HardwareFetim {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

impl FetimDriver for HardwareFetim {
    fn read_interlock_temperature(&self, sensor: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_INTERLOCK_TEMP, 2, sensor as u32)?;
        Ok(data as f32 / 100.0)
    }

    fn read_interlock_flow(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_INTERLOCK_FLOW, 2, 0)?;
        Ok(data as f32 / 100.0)
    }

    fn read_interlock_faults(&self) -> Result<(bool, bool), ErrorKind> {
        let (_, data) = self.transact(cmd::GET_INTERLOCK_FAULTS, 1, 0)?;
        Ok((data & 0x1 != 0, data & 0x2 != 0))
    }

    fn set_compressor_enable(&self, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_COMPRESSOR_ENABLE, 1, enable as u32)?;
        Ok(())
    }

    fn read_compressor_fault(&self) -> Result<bool, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_COMPRESSOR_FAULT, 1, 0)?;
        Ok(data != 0)
    }

    fn read_he2_pressure(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_HE2_PRESSURE, 2, 0)?;
        Ok(data as f32 / 1000.0)
    }

    fn read_external_temperature(&self, sensor: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_EXTERNAL_TEMP, 2, sensor as u32)?;
        Ok(data as f32 / 100.0)
    }

    fn set_n2_fill_enable(&self, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_N2_FILL_ENABLE, 1, enable as u32)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct SimulatedFetim;

impl FetimDriver for SimulatedFetim {
    fn read_interlock_temperature(&self, _sensor: usize) -> Result<f32, ErrorKind> {
        Ok(20.0)
    }
    fn read_interlock_flow(&self) -> Result<f32, ErrorKind> {
        Ok(1.0)
    }
    fn read_interlock_faults(&self) -> Result<(bool, bool), ErrorKind> {
        Ok((false, false))
    }
    fn set_compressor_enable(&self, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_compressor_fault(&self) -> Result<bool, ErrorKind> {
        Ok(false)
    }
    fn read_he2_pressure(&self) -> Result<f32, ErrorKind> {
        Ok(250.0)
    }
    fn read_external_temperature(&self, _sensor: usize) -> Result<f32, ErrorKind> {
        Ok(22.0)
    }
    fn set_n2_fill_enable(&self, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
}
