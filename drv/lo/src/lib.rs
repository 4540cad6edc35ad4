//! LO chain bus driver: YTO coarse tune, PLL lock/correction-voltage
//! readback, photomixer enable, and the two per-polarization power
//! amplifiers (spec.md §4.1, §4.7; grounded on `yto.c`'s one-submodule
//! dispatch and the LO power-amplifier fields in `paChannel.h`).

use femc_abi::ErrorKind;
use femc_bus::Bus;

/// SSC command bytes for the LO's serial interface. Names follow the
/// set/get functions in the original `loSerialInterface`.
mod cmd {
    pub const SET_YTO_COARSE_TUNE: u8 = 0x01;
    pub const GET_YTO_COARSE_TUNE: u8 = 0x02;
    pub const GET_PLL_LOCK_DETECT: u8 = 0x03;
    pub const GET_PLL_CORR_VOLTAGE: u8 = 0x04;
    pub const SET_PHOTOMIXER_ENABLE: u8 = 0x05;
    pub const SET_PA_DRAIN_VOLTAGE: u8 = 0x10;
    pub const GET_PA_DRAIN_CURRENT: u8 = 0x11;
    pub const SET_PA_GATE_VOLTAGE: u8 = 0x12;
    pub const GET_PA_TEMPERATURE: u8 = 0x13;
}

pub const YTO_TUNING_MAX: u16 = 4095;

pub trait LoDriver: Send + Sync {
    fn set_yto_tuning(&self, value: u16) -> Result<(), ErrorKind>;
    fn read_yto_tuning(&self) -> Result<u16, ErrorKind>;
    fn read_pll_lock_detect(&self) -> Result<bool, ErrorKind>;
    fn read_pll_correction_voltage(&self) -> Result<f32, ErrorKind>;
    fn set_photomixer_enable(&self, enable: bool) -> Result<(), ErrorKind>;
    fn set_pa_drain_voltage(&self, polarization: usize, volts: f32) -> Result<(), ErrorKind>;
    fn read_pa_drain_current(&self, polarization: usize) -> Result<f32, ErrorKind>;
    fn set_pa_gate_voltage(&self, polarization: usize, volts: f32) -> Result<(), ErrorKind>;
    /// Reads back the PA assembly's own temperature sensor, the value
    /// the cartridge sweep checks against `PA_MAX_ALLOWED_TEMP`.
    fn read_pa_temperature(&self) -> Result<f32, ErrorKind>;
}

/// Converts a raw 12-bit ADC/DAC count to/from the volts and milliamps
/// the registry stores. The scale factors stand in for the per-board
/// calibration constants the real hardware carries in its EEPROM.
mod scale {
    pub const VOLTAGE_FULL_SCALE: f32 = 10.0;
    pub const CURRENT_FULL_SCALE_MA: f32 = 100.0;
    pub const DAC_COUNTS: f32 = 4095.0;

    pub fn volts_to_counts(volts: f32) -> u32 {
        ((volts / VOLTAGE_FULL_SCALE) * DAC_COUNTS).clamp(0.0, DAC_COUNTS) as u32
    }

    pub fn counts_to_volts(counts: u32) -> f32 {
        counts as f32 / DAC_COUNTS * VOLTAGE_FULL_SCALE
    }

    pub fn counts_to_milliamps(counts: u32) -> f32 {
        counts as f32 / DAC_COUNTS * CURRENT_FULL_SCALE_MA
    }
}

pub struct HardwareLo {
    bus: Bus,
}

impl HardwareLo {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn transact(&self, command: u8, length: u8, data: u32) -> Result<(u32, u32), ErrorKind> {
        self.bus
            .transact(command, length, data)
            .map_err(|_| ErrorKind::HardwareTimeout)
    }
}

impl LoDriver for HardwareLo {
    fn set_yto_tuning(&self, value: u16) -> Result<(), ErrorKind> {
        if value > YTO_TUNING_MAX {
            return Err(ErrorKind::CommandVal);
        }
        self.transact(cmd::SET_YTO_COARSE_TUNE, 2, value as u32)?;
        Ok(())
    }

    fn read_yto_tuning(&self) -> Result<u16, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_YTO_COARSE_TUNE, 2, 0)?;
        Ok(data as u16)
    }

    fn read_pll_lock_detect(&self) -> Result<bool, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PLL_LOCK_DETECT, 1, 0)?;
        Ok(data != 0)
    }

    fn read_pll_correction_voltage(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PLL_CORR_VOLTAGE, 2, 0)?;
        Ok(scale::counts_to_volts(data))
    }

    fn set_photomixer_enable(&self, enable: bool) -> Result<(), ErrorKind> {
        self.transact(cmd::SET_PHOTOMIXER_ENABLE, 1, enable as u32)?;
        Ok(())
    }

    fn set_pa_drain_voltage(&self, polarization: usize, volts: f32) -> Result<(), ErrorKind> {
        let counts = scale::volts_to_counts(volts);
        self.transact(
            cmd::SET_PA_DRAIN_VOLTAGE,
            2,
            (polarization as u32) << 16 | counts,
        )?;
        Ok(())
    }

    fn read_pa_drain_current(&self, polarization: usize) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PA_DRAIN_CURRENT, 2, (polarization as u32) << 16)?;
        Ok(scale::counts_to_milliamps(data))
    }

    fn set_pa_gate_voltage(&self, polarization: usize, volts: f32) -> Result<(), ErrorKind> {
        let counts = scale::volts_to_counts(volts);
        self.transact(
            cmd::SET_PA_GATE_VOLTAGE,
            2,
            (polarization as u32) << 16 | counts,
        )?;
        Ok(())
    }

    fn read_pa_temperature(&self) -> Result<f32, ErrorKind> {
        let (_, data) = self.transact(cmd::GET_PA_TEMPERATURE, 2, 0)?;
        Ok(data as f32 / 100.0)
    }
}

/// In-memory stand-in used under `SIMULATION_MODE` and in tests; holds
/// the last value written to each point rather than talking to a bus.
pub struct SimulatedLo {
    yto_tuning: std::sync::Mutex<u16>,
    pll_lock: std::sync::Mutex<bool>,
    pa_drain_voltage: std::sync::Mutex<[f32; 2]>,
}

impl Default for SimulatedLo {
    fn default() -> Self {
        Self {
            yto_tuning: std::sync::Mutex::new(0),
            pll_lock: std::sync::Mutex::new(true),
            pa_drain_voltage: std::sync::Mutex::new([0.0; 2]),
        }
    }
}

impl LoDriver for SimulatedLo {
    fn set_yto_tuning(&self, value: u16) -> Result<(), ErrorKind> {
        if value > YTO_TUNING_MAX {
            return Err(ErrorKind::CommandVal);
        }
        *self.yto_tuning.lock().unwrap() = value;
        Ok(())
    }

    fn read_yto_tuning(&self) -> Result<u16, ErrorKind> {
        Ok(*self.yto_tuning.lock().unwrap())
    }

    fn read_pll_lock_detect(&self) -> Result<bool, ErrorKind> {
        Ok(*self.pll_lock.lock().unwrap())
    }

    fn read_pll_correction_voltage(&self) -> Result<f32, ErrorKind> {
        Ok(0.0)
    }

    fn set_photomixer_enable(&self, _enable: bool) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn set_pa_drain_voltage(&self, polarization: usize, volts: f32) -> Result<(), ErrorKind> {
        self.pa_drain_voltage.lock().unwrap()[polarization] = volts;
        Ok(())
    }

    fn read_pa_drain_current(&self, polarization: usize) -> Result<f32, ErrorKind> {
        Ok(self.pa_drain_voltage.lock().unwrap()[polarization] * 10.0)
    }

    fn set_pa_gate_voltage(&self, _polarization: usize, _volts: f32) -> Result<(), ErrorKind> {
        Ok(())
    }

    fn read_pa_temperature(&self) -> Result<f32, ErrorKind> {
        Ok(15.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yto_tuning_rejects_out_of_range() {
        let lo = SimulatedLo::default();
        assert!(lo.set_yto_tuning(YTO_TUNING_MAX + 1).is_err());
        assert!(lo.set_yto_tuning(YTO_TUNING_MAX).is_ok());
    }
}
