//! IF switch bus driver (spec.md §4.1; grounded on `ifSwitch.c`'s
//! `bandSelectHandler`/`allChannelsHandler`).

use femc_abi::ErrorKind;
use femc_bus::Bus;

mod cmd {
    pub const SET_BAND_SELECT: u8 = 0x40;
    pub const SET_CHANNEL_ATTENUATION: u8 = 0x41;
}

pub trait IfSwitchDriver: Send + Sync {
    fn set_band_select(&self, band: u8) -> Result<(), ErrorKind>;
    fn set_channel_attenuation(&self, channel: usize, attenuation: u8) -> Result<(), ErrorKind>;
}

pub struct HardwareIfSwitch {
    bus: Bus,
}

impl HardwareIfSwitch {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

impl IfSwitchDriver for HardwareIfSwitch {
    fn set_band_select(&self, band: u8) -> Result<(), ErrorKind> {
        self.bus
            .transact(cmd::SET_BAND_SELECT, 1, band as u32)
            .map_err(|_| ErrorKind::HardwareTimeout)?;
        Ok(())
    }

    fn set_channel_attenuation(&self, channel: usize, attenuation: u8) -> Result<(), ErrorKind> {
        self.bus
            .transact(
                cmd::SET_CHANNEL_ATTENUATION,
                1,
                (channel as u32) << 8 | attenuation as u32,
            )
            .map_err(|_| ErrorKind::HardwareTimeout)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct SimulatedIfSwitch;

impl IfSwitchDriver for SimulatedIfSwitch {
    fn set_band_select(&self, _band: u8) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn set_channel_attenuation(&self, _channel: usize, _attenuation: u8) -> Result<(), ErrorKind> {
        Ok(())
    }
}
