//! Non-volatile image: the flat snapshot written by `SET_WRITE_NV_MEMORY`
//! and read back at start of day (spec.md §3, §6).

use std::path::Path;

use femc_registry::palimits::PaLimitEntry;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct CartridgeEsn {
    pub bytes: [u8; 8],
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct NvImage {
    pub cartridge_esn: Vec<CartridgeEsn>,
    /// `pa_limits[cartridge][polarization]`.
    pub pa_limits: Vec<[Vec<PaLimitEntry>; 2]>,
    pub ip_address: [u8; 4],
}

impl NvImage {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(ConfigError::NvRead)?;
        bincode::deserialize(&bytes).map_err(ConfigError::NvDecode)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let bytes = bincode::serialize(self).map_err(ConfigError::NvEncode)?;
        std::fs::write(path, bytes).map_err(ConfigError::NvWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("femc-nv-test-{:p}.bin", &dir));
        let image = NvImage {
            cartridge_esn: vec![CartridgeEsn { bytes: [1; 8] }],
            pa_limits: vec![[vec![], vec![]]],
            ip_address: [192, 168, 1, 1],
        };
        image.save(&path).unwrap();
        let loaded = NvImage::load(&path).unwrap();
        assert_eq!(loaded.ip_address, [192, 168, 1, 1]);
        std::fs::remove_file(&path).ok();
    }
}
