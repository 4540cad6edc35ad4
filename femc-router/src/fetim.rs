//! FETIM module dispatch (spec.md §4.1, §4.5): interlock sensors,
//! compressor, and dewar N2-fill valve. Requests against an absent
//! FETIM installation return `HARDW_ERROR` without touching the bus
//! (spec.md §4.3).

use femc_abi::address::field;
use femc_abi::{ErrorKind, Payload, Reply, Request, Status, WireValue};
use femc_registry::fetim::Fetim;

use crate::point;

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;
const INDEX_SHIFT: u32 = 0;
const INDEX_MASK: u32 = 0xF;

mod submodule {
    pub const INTERLOCK_TEMPERATURE: u32 = 0;
    pub const INTERLOCK_FLOW: u32 = 1;
    pub const INTERLOCK_SHUTDOWN_TRIGGER: u32 = 2;
    pub const COMPRESSOR_ENABLE: u32 = 3;
    pub const COMPRESSOR_FAULT: u32 = 4;
    pub const HE2_PRESSURE: u32 = 5;
    pub const N2_FILL_ENABLE: u32 = 6;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    registry: &Fetim,
    driver: &dyn drv_fetim::FetimDriver,
) -> Reply {
    if !*registry.available.lock().unwrap() {
        return Reply::new(Payload::empty(), ErrorKind::ModulePower.as_status());
    }

    let index = field(address, INDEX_SHIFT, INDEX_MASK) as usize;

    match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::INTERLOCK_TEMPERATURE => {
            let temps = registry.interlock.temperature.lock().unwrap();
            match temps.get(index) {
                Some(&value) => Reply::new(value.encode(), Status::NoError),
                None => Reply::new(Payload::empty(), Status::HardwRngErr),
            }
        }
        submodule::INTERLOCK_FLOW => point::monitor_only(|| driver.read_interlock_flow()),
        submodule::INTERLOCK_SHUTDOWN_TRIGGER => {
            let value = *registry.interlock.shutdown_trigger.lock().unwrap();
            if request.is_control_write() {
                match bool::decode(request.payload) {
                    Some(false) => {
                        *registry.interlock.shutdown_trigger.lock().unwrap() = false;
                        Reply::new(Payload::empty(), Status::NoError)
                    }
                    _ => Reply::new(Payload::empty(), Status::ConErrorRng),
                }
            } else {
                Reply::new(value.encode(), Status::NoError)
            }
        }
        submodule::COMPRESSOR_ENABLE => point::writable(
            request,
            &registry.compressor.enable,
            |_| true,
            |enable| driver.set_compressor_enable(enable),
        ),
        submodule::COMPRESSOR_FAULT => point::monitor_only(|| driver.read_compressor_fault()),
        submodule::HE2_PRESSURE => point::monitor_only(|| driver.read_he2_pressure()),
        submodule::N2_FILL_ENABLE => point::writable(
            request,
            &registry.dewar.n2_fill_enable,
            |_| true,
            |enable| driver.set_n2_fill_enable(enable),
        ),
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    }
}
