//! Per-cartridge submodule dispatch (spec.md §4.1, §4.7).
//!
//! A cartridge's 12-bit remainder of the RCA is split the same way
//! every level of the tree is: a submodule nibble at bits 8-11 picks
//! the point, with polarization (bits 4-7) and SIS/stage index (bits
//! 0-3) as needed underneath it. This implements a representative
//! slice of the full bias tree (YTO/PLL/photomixer/PA plus one SIS
//! mixer's voltage, current and magnet, the LNA enable/LED, the
//! heater, and the band-7 Teledyne PA flag) rather than every LNA
//! stage and SIS channel combination; the remaining leaves follow the
//! same `point::writable` / `point::monitor_only` pattern and are not
//! a difference in kind. YTO retune, PA drain voltage, LNA LED, and
//! SIS magnet current carry bespoke handlers rather than the generic
//! `point` helpers, since each enforces one of §4.7's safety
//! interlocks before touching hardware.

use femc_abi::address::field;
use femc_abi::{ErrorKind, ModuleId, Payload, Reply, Request, Status, WireValue};
use femc_registry::cartridge::{Cartridge, CartridgeBand};
use femc_registry::FrontEnd;

use crate::drivers::Drivers;
use crate::point;

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;
const POL_SHIFT: u32 = 4;
const POL_MASK: u32 = 0xF;
const INDEX_SHIFT: u32 = 0;
const INDEX_MASK: u32 = 0xF;

mod submodule {
    pub const YTO_TUNING: u32 = 0;
    pub const PLL_LOCK_DETECT: u32 = 1;
    pub const PLL_CORRECTION_VOLTAGE: u32 = 2;
    pub const PHOTOMIXER_ENABLE: u32 = 3;
    pub const PA_DRAIN_VOLTAGE: u32 = 4;
    pub const STANDBY2: u32 = 5;
    pub const BIAS_SIS_VOLTAGE: u32 = 6;
    pub const BIAS_SIS_CURRENT: u32 = 7;
    pub const BIAS_LNA_ENABLE: u32 = 8;
    pub const BIAS_LNA_LED_ENABLE: u32 = 9;
    pub const BIAS_SIS_MAGNET_CURRENT: u32 = 10;
    pub const BIAS_HEATER_ENABLE: u32 = 11;
    pub const PA_TEMPERATURE: u32 = 12;
    pub const HAS_TELEDYNE_PA: u32 = 13;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    cartridge_index: usize,
    cartridge: &Cartridge,
    drivers: &Drivers,
    front_end: &FrontEnd,
) -> Reply {
    if !cartridge.is_present() {
        front_end.record_error(ModuleId::Cartridge(cartridge_index as u8), ErrorKind::ModulePower);
        return Reply::new(Payload::empty(), ErrorKind::ModulePower.as_status());
    }

    let pol = field(address, POL_SHIFT, POL_MASK) as usize;
    let index = field(address, INDEX_SHIFT, INDEX_MASK) as usize;

    let reply = match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::YTO_TUNING => yto_tuning(request, cartridge_index, cartridge, drivers, front_end),
        submodule::PLL_LOCK_DETECT => point::monitor_only(|| drivers.lo.read_pll_lock_detect()),
        submodule::PLL_CORRECTION_VOLTAGE => {
            point::monitor_only(|| drivers.lo.read_pll_correction_voltage())
        }
        submodule::PHOTOMIXER_ENABLE => point::writable(
            request,
            &cartridge.lo.photomixer_enable,
            |_| true,
            |enable| drivers.lo.set_photomixer_enable(enable),
        ),
        submodule::PA_DRAIN_VOLTAGE => {
            if pol >= cartridge.lo.pa_pol.len() {
                return Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status());
            }
            pa_drain_voltage(request, cartridge_index, pol, cartridge, drivers, front_end)
        }
        submodule::STANDBY2 => standby2(request, cartridge),
        submodule::BIAS_SIS_VOLTAGE => sis_voltage(request, cartridge, pol, index, drivers),
        submodule::BIAS_SIS_CURRENT => point::monitor_only(|| drivers.bias.read_sis_current(pol, index)),
        submodule::BIAS_LNA_ENABLE => match cartridge.bias.polarizations.get(pol) {
            Some(polarization) => point::writable(
                request,
                &polarization.lna_enable,
                |_| true,
                |enable| drivers.bias.set_lna_enable(pol, enable),
            ),
            None => Reply::new(Payload::empty(), Status::HardwRngErr),
        },
        submodule::BIAS_LNA_LED_ENABLE => lna_led_enable(request, cartridge, pol, drivers),
        submodule::BIAS_SIS_MAGNET_CURRENT => sis_magnet_current(request, cartridge, pol, index, drivers),
        submodule::BIAS_HEATER_ENABLE => heater_enable(request, cartridge, pol, drivers),
        submodule::PA_TEMPERATURE => {
            let temp = *cartridge.pa_temperature.lock().unwrap();
            Reply::new(temp.encode(), Status::NoError)
        }
        submodule::HAS_TELEDYNE_PA => has_teledyne_pa(request, cartridge),
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    };

    reply
}

/// Writing `hasTeledynePa` outside band 7 is refused outright; the
/// chip only exists on that band's LO (spec.md §3, §4.1, §8).
fn has_teledyne_pa(request: &Request, cartridge: &Cartridge) -> Reply {
    if request.is_control_write() {
        if cartridge.band != CartridgeBand::Band7 {
            return Reply::new(Payload::empty(), Status::HardwBlkdErr);
        }
        let Some(enable) = bool::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        *cartridge.has_teledyne_pa.lock().unwrap() = enable;
        Reply::new(Payload::empty(), Status::NoError)
    } else {
        let value = *cartridge.has_teledyne_pa.lock().unwrap();
        Reply::new(value.encode(), Status::NoError)
    }
}

/// YTO retune (spec.md §4.1, §4.7). Outside `TROUBLESHOOTING` mode, a
/// retune re-checks both polarizations' commanded drain voltage
/// against the PA-limits table bounding the *new* tuning and clamps
/// down any setpoint that now exceeds it; the clamp is advisory (the
/// retune itself still succeeds with `HARDW_BLKD_ERR` on the YTO
/// shadow) unless writing a clamped value back to hardware fails, in
/// which case the retune itself is refused.
fn yto_tuning(
    request: &Request,
    cartridge_index: usize,
    cartridge: &Cartridge,
    drivers: &Drivers,
    front_end: &FrontEnd,
) -> Reply {
    if request.is_control_write() {
        let Some(value) = u16::decode(request.payload) else {
            let mut shadow = cartridge.lo.yto_tuning_shadow.lock().unwrap();
            shadow.save(request.payload);
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };

        let mut shadow = cartridge.lo.yto_tuning_shadow.lock().unwrap();
        shadow.save_value(value);

        if value > drv_lo::YTO_TUNING_MAX {
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        }

        match drivers.lo.set_yto_tuning(value) {
            Ok(()) => {
                *cartridge.lo.yto_tuning.lock().unwrap() = value;

                if !front_end.mode.is_troubleshooting() {
                    match retune_pa_limits(cartridge_index, value, cartridge, drivers, front_end) {
                        Ok(false) => shadow.set_status(Status::NoError),
                        Ok(true) => shadow.set_status(Status::HardwBlkdErr),
                        Err(()) => {
                            shadow.set_status(Status::Error);
                            return Reply::new(Payload::empty(), Status::Error);
                        }
                    }
                } else {
                    shadow.set_status(Status::NoError);
                }
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                shadow.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let shadow = cartridge.lo.yto_tuning_shadow.lock().unwrap();
        let (payload, status) = shadow.load();
        Reply::new(payload, status)
    }
}

/// Clamps each polarization's currently-commanded drain voltage to the
/// limit bounding `yto_tuning`, re-applying to hardware where the
/// clamp actually lowers the setpoint. Returns whether any
/// polarization was clamped, or `Err` if a clamp write itself fails.
fn retune_pa_limits(
    cartridge_index: usize,
    yto_tuning: u16,
    cartridge: &Cartridge,
    drivers: &Drivers,
    front_end: &FrontEnd,
) -> Result<bool, ()> {
    let tables = front_end.pa_limits.lock().unwrap();
    let Some(pair) = tables.get(cartridge_index) else {
        return Ok(false);
    };

    let mut clamped = false;
    for (pol, table) in pair.iter().enumerate() {
        let mut shadow = cartridge.lo.pa_pol[pol].drain_voltage.lock().unwrap();
        let Some(current) = shadow.value() else {
            continue;
        };
        let limit = femc_interlock::clamp(table, yto_tuning, current);
        if limit < current {
            match drivers.lo.set_pa_drain_voltage(pol, limit) {
                Ok(()) => {
                    shadow.save_value(limit);
                    shadow.set_status(Status::HardwBlkdErr);
                    clamped = true;
                }
                Err(_) => return Err(()),
            }
        }
    }
    Ok(clamped)
}

fn pa_drain_voltage(
    request: &Request,
    cartridge_index: usize,
    pol: usize,
    cartridge: &Cartridge,
    drivers: &Drivers,
    front_end: &FrontEnd,
) -> Reply {
    if request.is_control_write() {
        let Some(requested) = f32::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };

        if femc_interlock::temperature_trips_interlock(&pa_temperature_sensors(front_end)) {
            front_end.record_error(ModuleId::Cartridge(cartridge_index as u8), ErrorKind::HardwareBlocked);
            return Reply::new(Payload::empty(), Status::HardwBlkdErr);
        }

        let yto_tuning = *cartridge.lo.yto_tuning.lock().unwrap();
        let tables = front_end.pa_limits.lock().unwrap();
        let applied = match tables.get(cartridge_index) {
            Some(pair) => femc_interlock::clamp(&pair[pol], yto_tuning, requested),
            None => requested,
        };
        drop(tables);

        let mut shadow = cartridge.lo.pa_pol[pol].drain_voltage.lock().unwrap();
        shadow.save_value(applied);
        match drivers.lo.set_pa_drain_voltage(pol, applied) {
            Ok(()) => {
                shadow.set_status(Status::NoError);
                Reply::new(applied.encode(), Status::NoError)
            }
            Err(err) => {
                shadow.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let shadow = cartridge.lo.pa_pol[pol].drain_voltage.lock().unwrap();
        let (payload, status) = shadow.load();
        Reply::new(payload, status)
    }
}

/// The 4K and 12K cryostat sensors the PA temperature interlock
/// watches: `cryostatTemp.h` lists indices 0-4 as the 4K stage and 5-8
/// as the 12K stage, the first `TVO_SENSORS_NUMBER` entries.
fn pa_temperature_sensors(front_end: &FrontEnd) -> Vec<f32> {
    let sensors = front_end.cryostat.temperature.lock().unwrap();
    sensors[..femc_registry::cryostat::TVO_SENSORS_NUMBER]
        .iter()
        .map(|s| s.temperature)
        .collect()
}

fn standby2(request: &Request, cartridge: &Cartridge) -> Reply {
    if request.is_control_write() {
        let Some(enter) = bool::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        if enter {
            femc_interlock::enter_standby2(cartridge);
        } else {
            femc_interlock::leave_standby2(cartridge);
        }
        Reply::new(Payload::empty(), Status::NoError)
    } else {
        let value = *cartridge.standby2.lock().unwrap();
        Reply::new(value.encode(), Status::NoError)
    }
}

fn sis_voltage(
    request: &Request,
    cartridge: &Cartridge,
    pol: usize,
    sis: usize,
    drivers: &Drivers,
) -> Reply {
    let Some(polarization) = cartridge.bias.polarizations.get(pol) else {
        return Reply::new(Payload::empty(), Status::HardwRngErr);
    };
    if request.is_control_write() {
        let Some(millivolts) = f32::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        let mut sis_mixers = polarization.sis.lock().unwrap();
        let Some(mixer) = sis_mixers.get_mut(sis) else {
            return Reply::new(Payload::empty(), Status::HardwRngErr);
        };
        mixer.voltage.save_value(millivolts);
        match drivers.bias.set_sis_voltage(pol, sis, millivolts) {
            Ok(()) => {
                mixer.voltage.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                mixer.voltage.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let sis_mixers = polarization.sis.lock().unwrap();
        match sis_mixers.get(sis) {
            Some(mixer) => {
                let (payload, status) = mixer.voltage.load();
                Reply::new(payload, status)
            }
            None => Reply::new(Payload::empty(), Status::HardwRngErr),
        }
    }
}

fn sis_magnet_current(
    request: &Request,
    cartridge: &Cartridge,
    pol: usize,
    sis: usize,
    drivers: &Drivers,
) -> Reply {
    let Some(polarization) = cartridge.bias.polarizations.get(pol) else {
        return Reply::new(Payload::empty(), Status::HardwRngErr);
    };
    if request.is_control_write() {
        let Some(milliamps) = f32::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        let mut magnets = polarization.sis_magnet.lock().unwrap();
        let Some(magnet) = magnets.get_mut(sis) else {
            return Reply::new(Payload::empty(), Status::HardwRngErr);
        };
        magnet.current.save_value(milliamps);
        if *cartridge.standby2.lock().unwrap() {
            magnet.current.set_status(Status::HardwBlkdErr);
            return Reply::new(Payload::empty(), Status::HardwBlkdErr);
        }
        match drivers.bias.set_magnet_current(pol, sis, milliamps) {
            Ok(()) => {
                magnet.current.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                magnet.current.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let magnets = polarization.sis_magnet.lock().unwrap();
        match magnets.get(sis) {
            Some(magnet) => {
                let (payload, status) = magnet.current.load();
                Reply::new(payload, status)
            }
            None => Reply::new(Payload::empty(), Status::HardwRngErr),
        }
    }
}

fn lna_led_enable(request: &Request, cartridge: &Cartridge, pol: usize, drivers: &Drivers) -> Reply {
    let Some(polarization) = cartridge.bias.polarizations.get(pol) else {
        return Reply::new(Payload::empty(), Status::HardwRngErr);
    };
    if request.is_control_write() {
        let Some(enable) = bool::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        let mut led = polarization.lna_led.lock().unwrap();
        led.enable.save_value(enable);
        if *cartridge.standby2.lock().unwrap() {
            led.enable.set_status(Status::HardwBlkdErr);
            return Reply::new(Payload::empty(), Status::HardwBlkdErr);
        }
        match drivers.bias.set_lna_led_enable(pol, enable) {
            Ok(()) => {
                led.enable.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                led.enable.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let led = polarization.lna_led.lock().unwrap();
        let (payload, status) = led.enable.load();
        Reply::new(payload, status)
    }
}

fn heater_enable(request: &Request, cartridge: &Cartridge, pol: usize, drivers: &Drivers) -> Reply {
    let Some(polarization) = cartridge.bias.polarizations.get(pol) else {
        return Reply::new(Payload::empty(), Status::HardwRngErr);
    };
    if request.is_control_write() {
        let Some(enable) = bool::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        let mut heater = polarization.sis_heater.lock().unwrap();
        heater.enable.save_value(enable);
        match drivers.bias.set_heater_enable(pol, enable) {
            Ok(()) => {
                heater.enable.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                heater.enable.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let heater = polarization.sis_heater.lock().unwrap();
        let (payload, status) = heater.enable.load();
        Reply::new(payload, status)
    }
}
