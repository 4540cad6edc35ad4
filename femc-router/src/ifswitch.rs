//! IF switch module dispatch (spec.md §4.1): band select plus four
//! channel attenuators.

use femc_abi::address::field;
use femc_abi::{ErrorKind, Payload, Reply, Request, Status, WireValue};
use femc_registry::ifswitch::{IfSwitch, ATTENUATION_MAX, BAND_MAX, BAND_MIN};

const SUBMODULE_SHIFT: u32 = 8;
const SUBMODULE_MASK: u32 = 0xF;
const CHANNEL_SHIFT: u32 = 0;
const CHANNEL_MASK: u32 = 0xF;

mod submodule {
    pub const BAND_SELECT: u32 = 0;
    pub const CHANNEL_ATTENUATION: u32 = 1;
}

pub fn dispatch(
    request: &Request,
    address: u32,
    registry: &IfSwitch,
    driver: &dyn drv_ifswitch::IfSwitchDriver,
) -> Reply {
    match field(address, SUBMODULE_SHIFT, SUBMODULE_MASK) {
        submodule::BAND_SELECT => band_select(request, registry, driver),
        submodule::CHANNEL_ATTENUATION => {
            let channel = field(address, CHANNEL_SHIFT, CHANNEL_MASK) as usize;
            channel_attenuation(request, registry, channel, driver)
        }
        _ => Reply::new(Payload::empty(), ErrorKind::RcaRange.as_status()),
    }
}

fn band_select(request: &Request, registry: &IfSwitch, driver: &dyn drv_ifswitch::IfSwitchDriver) -> Reply {
    if request.is_control_write() {
        let Some(band) = u8::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        if !(BAND_MIN..=BAND_MAX).contains(&band) {
            let mut shadow = registry.last_band_select.lock().unwrap();
            shadow.save_value(band);
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        }

        let mut shadow = registry.last_band_select.lock().unwrap();
        shadow.save_value(band);
        match driver.set_band_select(band) {
            Ok(()) => {
                *registry.band_select.lock().unwrap() = band;
                shadow.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(err) => {
                shadow.set_status(Status::Error);
                Reply::new(Payload::empty(), err.as_status())
            }
        }
    } else {
        let shadow = registry.last_band_select.lock().unwrap();
        let (payload, status) = shadow.load();
        Reply::new(payload, status)
    }
}

fn channel_attenuation(
    request: &Request,
    registry: &IfSwitch,
    channel: usize,
    driver: &dyn drv_ifswitch::IfSwitchDriver,
) -> Reply {
    let Some(chan) = registry.channels.get(channel) else {
        return Reply::new(Payload::empty(), Status::HardwRngErr);
    };
    if request.is_control_write() {
        let Some(value) = u8::decode(request.payload) else {
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };
        let mut shadow = chan.attenuation.lock().unwrap();
        shadow.save_value(value);
        if value > ATTENUATION_MAX {
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        }
        match driver.set_channel_attenuation(channel, value) {
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
        let shadow = chan.attenuation.lock().unwrap();
        let (payload, status) = shadow.load();
        Reply::new(payload, status)
    }
}
