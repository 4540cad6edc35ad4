//! Configuration loading: an INI file wrapper (grounded directly on
//! `original_source/inc/iniWrapper.h`'s `myReadCfg`/`myWriteCfg`) plus
//! the non-volatile image (spec.md §3, §6).

pub mod error;
pub mod nvmem;

use std::path::{Path, PathBuf};

use ini::Ini;

pub use error::ConfigError;
pub use nvmem::NvImage;

/// Top-level configuration, loaded once at start of day from the path
/// given on the command line (spec.md §6's `frontendInit`).
pub struct Config {
    ini: Ini,
    pub bus_base_address: usize,
    pub nv_image_path: PathBuf,
    pub listen_address: String,
}

const SECTION_GENERAL: &str = "general";
const SECTION_HARDWARE: &str = "hardware";

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| {
            ConfigError::FileOpen(std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;

        let bus_base_address = read_usize_hex(&ini, SECTION_HARDWARE, "busBaseAddress", 0)?;
        let nv_image_path = read_string(&ini, SECTION_GENERAL, "nvImagePath", "femc.nv")?;
        let listen_address =
            read_string(&ini, SECTION_GENERAL, "listenAddress", "0.0.0.0:1420")?;

        Ok(Self {
            ini,
            bus_base_address,
            nv_image_path: PathBuf::from(nv_image_path),
            listen_address,
        })
    }

    /// Equivalent of `myReadCfg`: looks up a single key in a section.
    pub fn read(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.ini
            .section(Some(section))
            .ok_or_else(|| ConfigError::SectionNotFound(section.to_string()))?
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Equivalent of `myWriteCfg`: used only by `SET_WRITE_NV_MEMORY`
    /// to persist an override back to the INI file (spec.md §6).
    pub fn write_back(&mut self, path: &Path, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        self.ini
            .with_section(Some(section))
            .set(key, value);
        self.ini
            .write_to_file(path)
            .map_err(ConfigError::NvWrite)
    }
}

fn read_string(ini: &Ini, section: &str, key: &str, default: &str) -> Result<String, ConfigError> {
    Ok(ini
        .section(Some(section))
        .and_then(|s| s.get(key))
        .unwrap_or(default)
        .to_string())
}

fn read_usize_hex(ini: &Ini, section: &str, key: &str, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = ini.section(Some(section)).and_then(|s| s.get(key)) else {
        return Ok(default);
    };
    let trimmed = raw.trim_start_matches("0x").trim_start_matches("0X");
    usize::from_str_radix(trimmed, 16).map_err(|_| ConfigError::BadValue {
        section: section.to_string(),
        key: key.to_string(),
    })
}
