//! Power distribution bus driver (spec.md §4.1; grounded on
//! `pdChannel.h`'s six voltage-rail channels per cartridge).

use femc_abi::ErrorKind;
use femc_bus::Bus;

mod cmd {
    pub const SET_CARTRIDGE_ENABLE: u8 = 0x50;
    pub const GET_RAIL_VOLTAGE: u8 = 0x51;
    pub const GET_RAIL_CURRENT: u8 = 0x52;
}

pub trait PowerDistDriver: Send + Sync {
    fn set_cartridge_enable(&self, cartridge: usize, enable: bool) -> Result<(), ErrorKind>;
    fn read_rail_voltage(&self, cartridge: usize, rail: usize) -> Result<f32, ErrorKind>;
    fn read_rail_current(&self, cartridge: usize, rail: usize) -> Result<f32, ErrorKind>;
}

fn addr(cartridge: usize, rail: usize) -> u32 {
    (cartridge as u32) << 8 | rail as u32
}

pub struct HardwarePowerDist {
    bus: Bus,
}

impl HardwarePowerDist {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

impl PowerDistDriver for HardwarePowerDist {
    fn set_cartridge_enable(&self, cartridge: usize, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_CARTRIDGE_ENABLE, 1, addr(cartridge, 0) | enable as u32)?;
        Ok(())
    }

    fn read_rail_voltage(&self, cartridge: usize, rail: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_RAIL_VOLTAGE, 2, addr(cartridge, rail))?;
        Ok(data as f32 / 1000.0)
    }

    fn read_rail_current(&self, cartridge: usize, rail: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_RAIL_CURRENT, 2, addr(cartridge, rail))?;
        Ok(data as f32 / 1000.0)
    }
}

#[derive(Default)]
pub struct SimulatedPowerDist;

impl PowerDistDriver for SimulatedPowerDist {
    fn set_cartridge_enable(&self, _cartridge: usize, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_rail_voltage(&self, _cartridge: usize, _rail: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn read_rail_current(&self, _cartridge: usize, _rail: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
}
