//! Request classification, RCA device-tree walk, and leaf handlers
//! (spec.md §4.1, §4.4), grounded on `original_source/src/packet.c`'s
//! `CANMessageHandler`/`standardRCAsHandler`: class extraction,
//! maintenance-mode short-circuit, and the bounded module dispatch
//! table.

pub mod cartridge;
pub mod cryostat;
pub mod drivers;
pub mod fetim;
pub mod ifswitch;
pub mod lpr;
pub mod point;
pub mod powerdist;
pub mod special;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use femc_abi::address::{module_index, Class, RCA_MASK};
use femc_abi::{ErrorKind, ModuleId, Payload, Reply, Request, Status};
use femc_registry::FrontEnd;

pub use drivers::Drivers;

const CARTRIDGE_MODULES: usize = 10;
const MODULE_POWER_DISTRIBUTION: u32 = 10;
const MODULE_IF_SWITCH: u32 = 11;
const MODULE_CRYOSTAT: u32 = 12;
const MODULE_LPR: u32 = 13;
const MODULE_FETIM: u32 = 14;

/// Owns everything a request needs answered against: the device-state
/// tree, the driver set, and the bits of process-level state (IP
/// address, shutdown flag, NV image path) that only the special
/// addresses touch.
pub struct Router {
    pub front_end: Arc<FrontEnd>,
    pub drivers: Drivers,
    pub ip_address: Mutex<[u8; 4]>,
    pub shutdown_requested: AtomicBool,
    pub nv_image_path: PathBuf,
}

impl Router {
    pub fn new(front_end: Arc<FrontEnd>, drivers: Drivers, nv_image_path: PathBuf) -> Self {
        Self {
            front_end,
            drivers,
            ip_address: Mutex::new([0, 0, 0, 0]),
            shutdown_requested: AtomicBool::new(false),
            nv_image_path,
        }
    }

    /// Classifies and routes one request. Returns `None` for the
    /// oversized-monitor case (spec.md §4.1): the request is silently
    /// dropped and no reply is sent.
    pub fn dispatch(&self, address: u32, payload: Payload) -> Option<Reply> {
        let address = address & RCA_MASK;
        let Some(class) = Class::from_address(address) else {
            return Some(Reply::new(Payload::empty(), Status::Error));
        };
        let request = Request::new(address, class, payload);

        if request.is_oversized_monitor() {
            return None;
        }

        if matches!(class, Class::Special) {
            let ctx = special::SpecialContext {
                front_end: &self.front_end,
                ip_address: &self.ip_address,
                shutdown_requested: &self.shutdown_requested,
                nv_image_path: &self.nv_image_path,
            };
            let (reply, _action) = special::dispatch(&request, address, &ctx);
            return Some(reply);
        }

        if self.front_end.mode.is_maintenance() {
            return Some(Reply::new(Payload::empty(), Status::HardwBlkdErr));
        }

        let Some(module) = module_index(address) else {
            self.front_end.record_error(ModuleId::Router, ErrorKind::ModuleRange);
            return Some(Reply::new(Payload::empty(), ErrorKind::ModuleRange.as_status()));
        };

        Some(self.dispatch_module(&request, address, module))
    }

    fn dispatch_module(&self, request: &Request, address: u32, module: u32) -> Reply {
        if (module as usize) < CARTRIDGE_MODULES {
            let index = module as usize;
            return match self.front_end.cartridge(index) {
                Some(cartridge) => cartridge::dispatch(
                    request,
                    address,
                    index,
                    cartridge,
                    &self.drivers,
                    &self.front_end,
                ),
                None => Reply::new(Payload::empty(), ErrorKind::ModuleRange.as_status()),
            };
        }

        match module {
            MODULE_POWER_DISTRIBUTION => powerdist::dispatch(
                request,
                address,
                &self.front_end.power_distribution,
                self.drivers.power.as_ref(),
            ),
            MODULE_IF_SWITCH => ifswitch::dispatch(
                request,
                address,
                &self.front_end.if_switch,
                self.drivers.if_switch.as_ref(),
            ),
            MODULE_CRYOSTAT => cryostat::dispatch(
                request,
                address,
                &self.front_end.cryostat,
                self.drivers.cryostat.as_ref(),
            ),
            MODULE_LPR => lpr::dispatch(request, address, &self.front_end.lpr, self.drivers.lpr.as_ref()),
            MODULE_FETIM => {
                fetim::dispatch(request, address, &self.front_end.fetim, self.drivers.fetim.as_ref())
            }
            _ => Reply::new(Payload::empty(), ErrorKind::ModuleRange.as_status()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use femc_abi::WireValue;

    fn router() -> Router {
        Router::new(
            Arc::new(FrontEnd::new()),
            Drivers::simulated(),
            PathBuf::from("/tmp/femc-router-test.nv"),
        )
    }

    const MONITOR: u32 = 0 << 16;
    const CONTROL: u32 = 1 << 16;
    const SPECIAL: u32 = 2 << 16;

    fn yto_address(cartridge: u32) -> u32 {
        cartridge << 12
    }

    #[test]
    fn version_probe_returns_firmware_version() {
        let r = router();
        let reply = r
            .dispatch(SPECIAL, Payload::empty())
            .expect("special address always replies");
        assert_eq!(reply.payload.as_slice(), &[1, 0, 0]);
        assert_eq!(reply.status, Status::NoError);
    }

    #[test]
    fn maintenance_mode_refuses_standard_requests() {
        let r = router();
        r.front_end.mode.set(femc_registry::Mode::Maintenance);
        *r.front_end.cartridges[0].present.lock().unwrap() = true;
        let reply = r
            .dispatch(CONTROL | yto_address(0), bool::encode(true))
            .expect("maintenance refusal still replies");
        assert_eq!(reply.status, Status::HardwBlkdErr);
    }

    #[test]
    fn oversized_monitor_is_dropped() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;
        let payload = Payload::u16_be(0x0FFF);
        assert!(r.dispatch(MONITOR | yto_address(0), payload).is_none());
    }

    #[test]
    fn yto_retune_round_trips_through_the_shadow() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;
        let payload = Payload::u16_be(0x0FFF);
        let reply = r.dispatch(CONTROL | yto_address(0), payload).unwrap();
        assert_eq!(reply.status, Status::NoError);

        let monitor_on_control = r
            .dispatch(CONTROL | yto_address(0), Payload::empty())
            .unwrap();
        assert_eq!(monitor_on_control.payload.as_u16_be(), Some(0x0FFF));
        assert_eq!(monitor_on_control.status, Status::NoError);
    }

    #[test]
    fn absent_cartridge_is_refused_without_touching_hardware() {
        let r = router();
        let reply = r
            .dispatch(MONITOR | yto_address(3), Payload::empty())
            .unwrap();
        assert_eq!(reply.status, ErrorKind::ModulePower.as_status());
    }

    #[test]
    fn module_out_of_range_is_rejected() {
        let r = router();
        let address = MONITOR | (15u32 << 12);
        let reply = r.dispatch(address, Payload::empty()).unwrap();
        assert_eq!(reply.status, ErrorKind::ModuleRange.as_status());
    }

    // Cartridge submodule numbers, mirrored from `cartridge::submodule`
    // (private to that file, same as `yto_address`'s submodule-0 assumption
    // above).
    const SUBMODULE_STANDBY2: u32 = 5;
    const SUBMODULE_PA_DRAIN_VOLTAGE: u32 = 4;
    const SUBMODULE_LNA_LED_ENABLE: u32 = 9;
    const SUBMODULE_HAS_TELEDYNE_PA: u32 = 13;

    fn cartridge_address(cartridge: u32, submodule: u32, pol: u32) -> u32 {
        (cartridge << 12) | (submodule << 8) | (pol << 4)
    }

    #[test]
    fn standby2_blocks_lna_led_write_but_not_entry() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;

        let enter = r
            .dispatch(
                CONTROL | cartridge_address(0, SUBMODULE_STANDBY2, 0),
                bool::encode(true),
            )
            .unwrap();
        assert_eq!(enter.status, Status::NoError);

        let led_write = r
            .dispatch(
                CONTROL | cartridge_address(0, SUBMODULE_LNA_LED_ENABLE, 0),
                bool::encode(true),
            )
            .unwrap();
        assert_eq!(led_write.status, Status::HardwBlkdErr);
    }

    #[test]
    fn lna_led_write_succeeds_outside_standby2() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;

        let led_write = r
            .dispatch(
                CONTROL | cartridge_address(0, SUBMODULE_LNA_LED_ENABLE, 0),
                bool::encode(true),
            )
            .unwrap();
        assert_eq!(led_write.status, Status::NoError);
    }

    #[test]
    fn yto_retune_clamps_drain_voltage_and_flags_the_shadow() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;

        for pol in 0..2 {
            let reply = r
                .dispatch(
                    CONTROL | cartridge_address(0, SUBMODULE_PA_DRAIN_VOLTAGE, pol),
                    f32::encode(2.0),
                )
                .unwrap();
            assert_eq!(reply.status, Status::NoError);
        }

        {
            let mut tables = r.front_end.pa_limits.lock().unwrap();
            let entry = femc_registry::palimits::PaLimitEntry {
                yto_tuning: 2000,
                max_drain_voltage: 1.0,
            };
            tables[0] = [
                femc_registry::palimits::PaLimitsTable::from_entries(vec![entry]),
                femc_registry::palimits::PaLimitsTable::from_entries(vec![entry]),
            ];
        }

        let retune = r
            .dispatch(CONTROL | yto_address(0), Payload::u16_be(2000))
            .unwrap();
        assert_eq!(retune.status, Status::NoError);

        let yto_monitor = r
            .dispatch(CONTROL | yto_address(0), Payload::empty())
            .unwrap();
        assert_eq!(yto_monitor.status, Status::HardwBlkdErr);

        for pol in 0..2 {
            let reply = r
                .dispatch(
                    MONITOR | cartridge_address(0, SUBMODULE_PA_DRAIN_VOLTAGE, pol),
                    Payload::empty(),
                )
                .unwrap();
            assert_eq!(reply.payload.as_f32_be(), Some(1.0));
        }
    }

    #[test]
    fn pa_drain_voltage_refused_above_pa_temperature_threshold() {
        let r = router();
        *r.front_end.cartridges[0].present.lock().unwrap() = true;
        r.front_end.cryostat.temperature.lock().unwrap()[0].temperature = 35.0;

        let reply = r
            .dispatch(
                CONTROL | cartridge_address(0, SUBMODULE_PA_DRAIN_VOLTAGE, 0),
                f32::encode(1.0),
            )
            .unwrap();
        assert_eq!(reply.status, Status::HardwBlkdErr);
    }

    #[test]
    fn has_teledyne_pa_refused_outside_band_7() {
        let r = router();
        // Cartridge 0 is band 1.
        *r.front_end.cartridges[0].present.lock().unwrap() = true;
        let reply = r
            .dispatch(
                CONTROL | cartridge_address(0, SUBMODULE_HAS_TELEDYNE_PA, 0),
                bool::encode(true),
            )
            .unwrap();
        assert_eq!(reply.status, Status::HardwBlkdErr);
    }

    #[test]
    fn has_teledyne_pa_accepted_on_band_7() {
        let r = router();
        // Cartridge index 6 is band 7 (CartridgeBand::from_index).
        *r.front_end.cartridges[6].present.lock().unwrap() = true;
        let reply = r
            .dispatch(
                CONTROL | cartridge_address(6, SUBMODULE_HAS_TELEDYNE_PA, 0),
                bool::encode(true),
            )
            .unwrap();
        assert_eq!(reply.status, Status::NoError);
    }
}
