//! Cryostat module dispatch (spec.md §4.1, §4.5): temperature sensors,
//! gate valve, vacuum controller, and the backing/turbo pump pair.
//! Temperature and pressure readings come from the registry (already
//! converted by the cryostat sweep), not a fresh driver transaction —
//! monitor reads never reissue hardware traffic (spec.md §4.1).

use femc_abi::address::field;
use femc_abi::{ErrorKind, Payload, Reply, Request, Status, WireValue};
use femc_registry::cryostat::{Cryostat, GateValveState};
use drv_cryostat::PumpKind;

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;
const INDEX_SHIFT: u32 = 0;
const INDEX_MASK: u32 = 0xF;

mod submodule {
    pub const TEMPERATURE: u32 = 0;
    pub const GATE_VALVE_STATE: u32 = 1;
    pub const GATE_VALVE_COMMAND: u32 = 2;
    pub const VACUUM_PRESSURE: u32 = 3;
    pub const VACUUM_ENABLE: u32 = 4;
    pub const BACKING_PUMP_ENABLE: u32 = 5;
    pub const TURBO_PUMP_ENABLE: u32 = 6;
    pub const SUPPLY_CURRENT_110V: u32 = 7;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    registry: &Cryostat,
    driver: &dyn drv_cryostat::CryostatDriver,
) -> Reply {
    let index = field(address, INDEX_SHIFT, INDEX_MASK) as usize;

    match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::TEMPERATURE => {
            let sensors = registry.temperature.lock().unwrap();
            match sensors.get(index) {
                Some(sensor) => Reply::new(sensor.temperature.encode(), Status::NoError),
                None => Reply::new(Payload::empty(), Status::HardwRngErr),
            }
        }
        submodule::GATE_VALVE_STATE => {
            let code = match *registry.gate_valve.state.lock().unwrap() {
                GateValveState::Unknown => 0u8,
                GateValveState::Open => 1,
                GateValveState::Closed => 2,
                GateValveState::OverCurrent => 3,
                GateValveState::Error => 4,
            };
            Reply::new(code.encode(), Status::NoError)
        }
        submodule::GATE_VALVE_COMMAND => {
            if request.is_control_write() {
                let Some(open) = bool::decode(request.payload) else {
                    return Reply::new(Payload::empty(), Status::ConErrorRng);
                };
                let mut shadow = registry.gate_valve.command.lock().unwrap();
                shadow.save_value(open);
                match driver.set_gate_valve_command(open) {
                    Ok(()) => {
                        shadow.set_status(Status::NoError);
                        Reply::new(Payload::empty(), Status::NoError)
                    }
                    Err(err) => {
                        shadow.set_status(Status::Error);
                        Reply::new(Payload::empty(), err.as_status())
                    }
                }
            } else {
                let shadow = registry.gate_valve.command.lock().unwrap();
                let (payload, status) = shadow.load();
                Reply::new(payload, status)
            }
        }
        submodule::VACUUM_PRESSURE => {
            let pressures = registry.vacuum.pressure.lock().unwrap();
            match pressures.get(index) {
                Some(&value) => Reply::new(value.encode(), Status::NoError),
                None => Reply::new(Payload::empty(), Status::HardwRngErr),
            }
        }
        submodule::VACUUM_ENABLE => writable_bool(
            request,
            &registry.vacuum.enable,
            |enable| driver.set_vacuum_enable(enable),
        ),
        submodule::BACKING_PUMP_ENABLE => writable_bool(
            request,
            &registry.backing_pump.enable,
            |enable| driver.set_pump_enable(PumpKind::Backing, enable),
        ),
        submodule::TURBO_PUMP_ENABLE => writable_bool(
            request,
            &registry.turbo_pump.enable,
            |enable| driver.set_pump_enable(PumpKind::Turbo, enable),
        ),
        submodule::SUPPLY_CURRENT_110V => {
            let value = *registry.supply_current_110v.lock().unwrap();
            Reply::new(value.encode(), Status::NoError)
        }
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    }
}

fn writable_bool(
    request: &Request,
    cell: &std::sync::Mutex<femc_abi::Shadow<bool>>,
    apply: impl FnOnce(bool) -> Result<(), ErrorKind>,
) -> Reply {
    crate::point::writable(request, cell, |_| true, apply)
}
