//! IF switch: band-select routing plus per-channel attenuators
//! (spec.md §4.1; grounded on the original `ifSwitch.c` band/channel
//! handlers).

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

pub const IF_CHANNELS_NUMBER: usize = 4;
pub const ATTENUATION_MIN: u8 = 0;
pub const ATTENUATION_MAX: u8 = 15;

pub const BAND_MIN: u8 = 1;
pub const BAND_MAX: u8 = 10;

pub struct IfChannel {
    pub attenuation: Mutex<Shadow<u8>>,
}

impl Default for IfChannel {
    fn default() -> Self {
        Self {
            attenuation: Mutex::new(Shadow::default()),
        }
    }
}

pub struct IfSwitch {
    pub band_select: Mutex<u8>,
    pub last_band_select: Mutex<Shadow<u8>>,
    pub channels: [IfChannel; IF_CHANNELS_NUMBER],
    pub last_all_channels_atten: Mutex<Shadow<[u8; IF_CHANNELS_NUMBER]>>,
}

impl Default for IfSwitch {
    fn default() -> Self {
        Self {
            band_select: Mutex::new(BAND_MIN),
            last_band_select: Mutex::new(Shadow::default()),
            channels: Default::default(),
            last_all_channels_atten: Mutex::new(Shadow::default()),
        }
    }
}
