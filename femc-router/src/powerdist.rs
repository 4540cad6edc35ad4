//! Power-distribution module dispatch (spec.md §4.1): one enable
//! switch and six rail voltage/current monitors per cartridge slot.

use femc_abi::address::field;
use femc_abi::{ErrorKind, Payload, Reply, Request, Status, WireValue};
use femc_registry::powerdist::PowerDistribution;

use crate::point;

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;
const SLOT_SHIFT: u32 = 4;
const SLOT_MASK: u32 = 0xF;
const RAIL_SHIFT: u32 = 0;
const RAIL_MASK: u32 = 0xF;

mod submodule {
    pub const ENABLE: u32 = 0;
    pub const RAIL_VOLTAGE: u32 = 1;
    pub const RAIL_CURRENT: u32 = 2;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    registry: &PowerDistribution,
    driver: &dyn drv_powerdist::PowerDistDriver,
) -> Reply {
    let slot = field(address, SLOT_SHIFT, SLOT_MASK) as usize;
    let Some(module) = registry.modules.get(slot) else {
        return Reply::new(Payload::empty(), ErrorKind::ModuleRange.as_status());
    };

    match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::ENABLE => point::writable(
            request,
            &module.enable,
            |_| true,
            |enable| driver.set_cartridge_enable(slot, enable),
        ),
        submodule::RAIL_VOLTAGE => {
            let rail = field(address, RAIL_SHIFT, RAIL_MASK) as usize;
            point::monitor_only(|| driver.read_rail_voltage(slot, rail))
        }
        submodule::RAIL_CURRENT => {
            let rail = field(address, RAIL_SHIFT, RAIL_MASK) as usize;
            point::monitor_only(|| driver.read_rail_current(slot, rail))
        }
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    }
}
