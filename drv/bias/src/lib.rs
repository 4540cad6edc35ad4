//! Cartridge bias bus driver: per-polarization SIS mixers, SIS magnets,
//! SIS heaters, three-stage LNAs, and the LNA LED, addressed by
//! polarization and (where applicable) stage/sis index (spec.md §4.1;
//! grounded on `sisMagnet.h`, `sisHeater.h`, `lnaLed.h`, `lna.h`).

use femc_abi::ErrorKind;
use femc_bus::Bus;

mod cmd {
    pub const SET_SIS_VOLTAGE: u8 = 0x20;
    pub const GET_SIS_CURRENT: u8 = 0x21;
    pub const SET_SIS_OPEN_LOOP: u8 = 0x22;
    pub const SET_MAGNET_CURRENT: u8 = 0x23;
    pub const GET_MAGNET_VOLTAGE: u8 = 0x24;
    pub const SET_HEATER_ENABLE: u8 = 0x25;
    pub const GET_HEATER_CURRENT: u8 = 0x26;
    pub const SET_LNA_ENABLE: u8 = 0x27;
    pub const SET_LNA_DRAIN_VOLTAGE: u8 = 0x28;
    pub const GET_LNA_DRAIN_CURRENT: u8 = 0x29;
    pub const SET_LNA_GATE_VOLTAGE: u8 = 0x2A;
    pub const SET_LNA_LED_ENABLE: u8 = 0x2B;
}

fn addr(polarization: usize, index: usize) -> u32 {
    (polarization as u32) << 24 | (index as u32) << 16
}

pub trait BiasDriver: Send + Sync {
    fn set_sis_voltage(&self, polarization: usize, sis: usize, millivolts: f32) -> Result<(), ErrorKind>;
    fn read_sis_current(&self, polarization: usize, sis: usize) -> Result<f32, ErrorKind>;
    fn set_sis_open_loop(&self, polarization: usize, sis: usize, open: bool) -> Result<(), ErrorKind>;
    fn set_magnet_current(&self, polarization: usize, sis: usize, milliamps: f32) -> Result<(), ErrorKind>;
    fn read_magnet_voltage(&self, polarization: usize, sis: usize) -> Result<f32, ErrorKind>;
    fn set_heater_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind>;
    fn read_heater_current(&self, polarization: usize) -> Result<f32, ErrorKind>;
    fn set_lna_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind>;
    fn set_lna_drain_voltage(&self, polarization: usize, stage: usize, volts: f32) -> Result<(), ErrorKind>;
    fn read_lna_drain_current(&self, polarization: usize, stage: usize) -> Result<f32, ErrorKind>;
    fn set_lna_gate_voltage(&self, polarization: usize, stage: usize, volts: f32) -> Result<(), ErrorKind>;
    fn set_lna_led_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind>;
}

pub struct HardwareBias {
    bus: Bus,
}

impl HardwareBias {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

const MV_FULL_SCALE: f32 = 20.0;
const MA_FULL_SCALE: f32 = 100.0;
const DAC_COUNTS: f32 = 4095.0;

fn to_counts(value: f32, full_scale: f32) -> u32 {
    ((value / full_scale) * DAC_COUNTS).clamp(0.0, DAC_COUNTS) as u32
}

fn from_counts(counts: u32, full_scale: f32) -> f32 {
    counts as f32 / DAC_COUNTS * full_scale
}

impl BiasDriver for HardwareBias {
    fn set_sis_voltage(&self, polarization: usize, sis: usize, millivolts: f32) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_SIS_VOLTAGE, 2, addr(polarization, sis) | to_counts(millivolts, MV_FULL_SCALE))?;
        Ok(())
    }

    fn read_sis_current(&self, polarization: usize, sis: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_SIS_CURRENT, 2, addr(polarization, sis))?;
        Ok(from_counts(data, MA_FULL_SCALE))
    }

    fn set_sis_open_loop(&self, polarization: usize, sis: usize, open: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_SIS_OPEN_LOOP, 1, addr(polarization, sis) | open as u32)?;
        Ok(())
    }

    fn set_magnet_current(&self, polarization: usize, sis: usize, milliamps: f32) -> Result<(), ErrorKind> {
        self.transact(
            cmd::SET_MAGNET_CURRENT,
            2,
            addr(polarization, sis) | to_counts(milliamps, MA_FULL_SCALE),
        )?;
        Ok(())
    }

    fn read_magnet_voltage(&self, polarization: usize, sis: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_MAGNET_VOLTAGE, 2, addr(polarization, sis))?;
        Ok(from_counts(data, MV_FULL_SCALE))
    }

    fn set_heater_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_HEATER_ENABLE, 1, addr(polarization, 0) | enable as u32)?;
        Ok(())
    }

    fn read_heater_current(&self, polarization: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_HEATER_CURRENT, 2, addr(polarization, 0))?;
        Ok(from_counts(data, MA_FULL_SCALE))
    }

    fn set_lna_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_LNA_ENABLE, 1, addr(polarization, 0) | enable as u32)?;
        Ok(())
    }

    fn set_lna_drain_voltage(&self, polarization: usize, stage: usize, volts: f32) -> Result<(), ErrorKind> {
        self.transact(
            cmd::SET_LNA_DRAIN_VOLTAGE,
            2,
            addr(polarization, stage) | to_counts(volts, MV_FULL_SCALE),
        )?;
        Ok(())
    }

    fn read_lna_drain_current(&self, polarization: usize, stage: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_LNA_DRAIN_CURRENT, 2, addr(polarization, stage))?;
        Ok(from_counts(data, MA_FULL_SCALE))
    }

    fn set_lna_gate_voltage(&self, polarization: usize, stage: usize, volts: f32) -> Result<(), ErrorKind> {
        self.transact(
            cmd::SET_LNA_GATE_VOLTAGE,
            2,
            addr(polarization, stage) | to_counts(volts, MV_FULL_SCALE),
        )?;
        Ok(())
    }

    fn set_lna_led_enable(&self, polarization: usize, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_LNA_LED_ENABLE, 1, addr(polarization, 0) | enable as u32)?;
        Ok(())
    }
}

/// Stand-in used under simulation mode; every setter is a no-op and
/// every getter returns a fixed, plausible value.
#[derive(Default)]
pub struct SimulatedBias;

impl BiasDriver for SimulatedBias {
    fn set_sis_voltage(&self, _p: usize, _s: usize, _v: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_sis_current(&self, _p: usize, _s: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_sis_open_loop(&self, _p: usize, _s: usize, _open: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn set_magnet_current(&self, _p: usize, _s: usize, _ma: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_magnet_voltage(&self, _p: usize, _s: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_heater_enable(&self, _p: usize, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_heater_current(&self, _p: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_lna_enable(&self, _p: usize, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn set_lna_drain_voltage(&self, _p: usize, _stage: usize, _v: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn read_lna_drain_current(&self, _p: usize, _stage: usize) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }
    fn set_lna_gate_voltage(&self, _p: usize, _stage: usize, _v: f32) -> Result<(), ErrorKind> {
        Ok(())
    }
    fn set_lna_led_enable(&self, _p: usize, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }
}
