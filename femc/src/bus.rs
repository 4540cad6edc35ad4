//! Wires up one `femc_bus::Bus` per physical device family and builds
//! the `Hardware*` driver set behind it (SPEC_FULL.md §2, §6). Each
//! port is one SSC register block (`femc_bus::regs::offset::BLOCK_WORDS`
//! words) laid out back to back from the configured base address.

use femc_bus::{Bus, HardwareBus};
use femc_router::Drivers;
use std::sync::Arc;

mod port {
    pub const LO: u64 = 0;
    pub const BIAS: u64 = 1;
    pub const POWER_DISTRIBUTION: u64 = 2;
    pub const IF_SWITCH: u64 = 3;
    pub const CRYOSTAT: u64 = 4;
    pub const LPR: u64 = 5;
    pub const FETIM: u64 = 6;
}

fn open(base: usize, port: u64, name: &'static str) -> anyhow::Result<Bus> {
    let words = femc_bus::regs::offset::BLOCK_WORDS as u64;
    let phys_base = base as u64 + port * words * std::mem::size_of::<u32>() as u64;
    let backend = HardwareBus::open(phys_base)?;
    Ok(Bus::new(name, Box::new(backend)))
}

/// Builds every `Hardware*` driver over its own mapped SSC port. Each
/// `HardwareBus::open` call maps `/dev/mem`, so this must only be
/// called once per process (spec.md §5's "acquired once at init and
/// held for the life of the process").
pub fn hardware_drivers(base: usize) -> anyhow::Result<Drivers> {
    Ok(Drivers {
        lo: Arc::new(drv_lo::HardwareLo::new(open(base, port::LO, "lo")?)),
        bias: Arc::new(drv_bias::HardwareBias::new(open(base, port::BIAS, "bias")?)),
        power: Arc::new(drv_powerdist::HardwarePowerDist::new(open(
            base,
            port::POWER_DISTRIBUTION,
            "power-distribution",
        )?)),
        if_switch: Arc::new(drv_ifswitch::HardwareIfSwitch::new(open(
            base,
            port::IF_SWITCH,
            "if-switch",
        )?)),
        cryostat: Arc::new(drv_cryostat::HardwareCryostat::new(open(
            base,
            port::CRYOSTAT,
            "cryostat",
        )?)),
        lpr: Arc::new(drv_lpr::HardwareLpr::new(open(base, port::LPR, "lpr")?)),
        fetim: Arc::new(drv_fetim::HardwareFetim::new(open(base, port::FETIM, "fetim")?)),
    })
}
