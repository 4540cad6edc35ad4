//! LPR module dispatch (spec.md §4.1): laser, photodetector and
//! modulation-input submodules.

use femc_abi::address::field;
use femc_abi::{ErrorKind, Payload, Reply, Request, Status, WireValue};
use femc_registry::lpr::Lpr;

use crate::point;

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;

mod submodule {
    pub const LASER_PUMP_CURRENT: u32 = 0;
    pub const LASER_DRIVE_CURRENT: u32 = 1;
    pub const PHOTO_DETECTOR_CURRENT: u32 = 2;
    pub const PHOTO_DETECTOR_POWER: u32 = 3;
    pub const MODULATION_INPUT: u32 = 4;
    pub const DRIVER_TEMPERATURE_ALARM: u32 = 5;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    registry: &Lpr,
    driver: &dyn drv_lpr::LprDriver,
) -> Reply {
    match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::LASER_PUMP_CURRENT => point::monitor_only(|| driver.read_pump_current()),
        submodule::LASER_DRIVE_CURRENT => point::writable(
            request,
            &registry.laser.drive_current,
            |_| true,
            |milliamps| driver.set_drive_current(milliamps),
        ),
        submodule::PHOTO_DETECTOR_CURRENT => {
            point::monitor_only(|| driver.read_photo_detector_current())
        }
        submodule::PHOTO_DETECTOR_POWER => point::monitor_only(|| driver.read_photo_detector_power()),
        submodule::MODULATION_INPUT => point::writable(
            request,
            &registry.modulation_input.value,
            |_| true,
            |value| driver.set_modulation_input(value),
        ),
        submodule::DRIVER_TEMPERATURE_ALARM => {
            point::monitor_only(|| driver.read_driver_temperature_alarm())
        }
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    }
}
