//! Special-class addresses (spec.md §6): version info, error-log
//! drain, operating mode, IP address, the four RCA range descriptors,
//! the per-band PA-limits ESN string, and the handful of special
//! controls (exit, reboot, write-NV-memory, PA-limits table edits).
//! Grounded on `original_source/src/packet.c`'s special-RCA table,
//! which is a flat index rather than the nested module/submodule tree
//! the standard classes use.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use femc_abi::{ModuleId, Payload, Reply, Request, Status};
use femc_config::NvImage;
use femc_registry::palimits::{PaLimitEntry, PaLimitsTable};
use femc_registry::FrontEnd;

const OP_SHIFT: u32 = 0;
const OP_MASK: u32 = 0xFF;
const BAND_SHIFT: u32 = 8;
const BAND_MASK: u32 = 0xF;

mod op {
    pub const VERSION_INFO: u32 = 0x00;
    pub const ERROR_COUNT: u32 = 0x01;
    pub const NEXT_ERROR: u32 = 0x02;
    pub const OPERATING_MODE: u32 = 0x03;
    pub const IP_ADDRESS: u32 = 0x04;
    pub const SPECIAL_MONITOR_RCA_RANGE: u32 = 0x05;
    pub const SPECIAL_CONTROL_RCA_RANGE: u32 = 0x06;
    pub const MONITOR_RCA_RANGE: u32 = 0x07;
    pub const CONTROL_RCA_RANGE: u32 = 0x08;
    pub const PA_LIMITS_ESN: u32 = 0x09;
    pub const EXIT_PROGRAM: u32 = 0x10;
    pub const REBOOT: u32 = 0x11;
    pub const WRITE_NV_MEMORY: u32 = 0x12;
    pub const CLEAR_PA_LIMITS: u32 = 0x13;
    pub const ADD_PA_LIMITS_ENTRY: u32 = 0x14;
}

/// The four RCA range descriptors (spec.md §6): each reports the
/// lowest and highest submodule-space address a request of that class
/// may use, derived from `femc_abi::address`'s module layout rather
/// than hand-kept constants.
mod rca_range {
    use femc_abi::address::{MODULES_NUMBER, MODULE_SHIFT};

    const STANDARD_HIGH: u16 = ((MODULES_NUMBER << MODULE_SHIFT) - 1) as u16;

    pub const MONITOR: (u16, u16) = (0, STANDARD_HIGH);
    pub const CONTROL: (u16, u16) = (0, STANDARD_HIGH);

    /// Special addresses are a flat `band:op` pair (`BAND_SHIFT`/`OP_MASK`
    /// in this module), distinct from the standard module tree.
    pub const SPECIAL_MONITOR: (u16, u16) = (0, 0x0FFF);
    pub const SPECIAL_CONTROL: (u16, u16) = (0, 0x0FFF);
}

/// What a special-address request asked the binary's entry point to do
/// beyond answering the reply; `femc-router` only classifies intent,
/// since process exit and NV persistence live outside the registry.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Action {
    #[default]
    None,
    Exit,
    Reboot,
    WriteNvMemory,
}

pub struct SpecialContext<'a> {
    pub front_end: &'a FrontEnd,
    pub ip_address: &'a Mutex<[u8; 4]>,
    pub shutdown_requested: &'a AtomicBool,
    pub nv_image_path: &'a Path,
}

pub fn dispatch(request: &Request, address: u32, ctx: &SpecialContext) -> (Reply, Action) {
    let band = femc_abi::address::field(address, BAND_SHIFT, BAND_MASK) as usize;

    match femc_abi::address::field(address, OP_SHIFT, OP_MASK) {
        op::VERSION_INFO => {
            let (major, minor, patch) = femc_registry::VERSION;
            (
                Reply::new(Payload::from_slice(&[major, minor, patch]), Status::NoError),
                Action::None,
            )
        }
        op::ERROR_COUNT => {
            let count = ctx.front_end.error_log.unread_count() as u16;
            (Reply::new(Payload::u16_be(count), Status::NoError), Action::None)
        }
        op::NEXT_ERROR => {
            let code = ctx.front_end.error_log.next_error_code();
            (Reply::new(Payload::u16_be(code), Status::NoError), Action::None)
        }
        op::OPERATING_MODE => operating_mode(request, ctx),
        op::IP_ADDRESS => {
            let addr = *ctx.ip_address.lock().unwrap();
            (Reply::new(Payload::from_slice(&addr), Status::NoError), Action::None)
        }
        op::SPECIAL_MONITOR_RCA_RANGE => (range_descriptor_reply(rca_range::SPECIAL_MONITOR), Action::None),
        op::SPECIAL_CONTROL_RCA_RANGE => (range_descriptor_reply(rca_range::SPECIAL_CONTROL), Action::None),
        op::MONITOR_RCA_RANGE => (range_descriptor_reply(rca_range::MONITOR), Action::None),
        op::CONTROL_RCA_RANGE => (range_descriptor_reply(rca_range::CONTROL), Action::None),
        op::PA_LIMITS_ESN => pa_limits_esn(band, ctx),
        op::EXIT_PROGRAM => {
            ctx.shutdown_requested.store(true, Ordering::SeqCst);
            (Reply::new(Payload::empty(), Status::NoError), Action::Exit)
        }
        op::REBOOT => {
            ctx.shutdown_requested.store(true, Ordering::SeqCst);
            (Reply::new(Payload::empty(), Status::NoError), Action::Reboot)
        }
        op::WRITE_NV_MEMORY => write_nv_memory(ctx),
        op::CLEAR_PA_LIMITS => clear_pa_limits(band, ctx),
        op::ADD_PA_LIMITS_ENTRY => add_pa_limits_entry(request, band, ctx),
        _ => {
            ctx.front_end
                .record_error(ModuleId::Router, femc_abi::ErrorKind::RcaRange);
            (Reply::new(Payload::empty(), Status::HardwRngErr), Action::None)
        }
    }
}

fn range_descriptor_reply((low, high): (u16, u16)) -> Reply {
    let mut bytes = [0u8; 4];
    bytes[..2].copy_from_slice(&low.to_be_bytes());
    bytes[2..].copy_from_slice(&high.to_be_bytes());
    Reply::new(Payload::from_slice(&bytes), Status::NoError)
}

/// Per-band reference ESN identifying the PA-limits table the LO's
/// drain-voltage clamp was characterized against (spec.md §3, §6).
fn pa_limits_esn(band: usize, ctx: &SpecialContext) -> (Reply, Action) {
    match ctx.front_end.cartridge(band) {
        Some(cartridge) => {
            let esn = *cartridge.lo.pa_limits_esn.lock().unwrap();
            (Reply::new(Payload::from_slice(&esn), Status::NoError), Action::None)
        }
        None => (Reply::new(Payload::empty(), Status::HardwRngErr), Action::None),
    }
}

fn operating_mode(request: &Request, ctx: &SpecialContext) -> (Reply, Action) {
    use femc_registry::Mode;

    if request.is_control_write() {
        let Some(code) = request.payload.as_byte() else {
            return (Reply::new(Payload::empty(), Status::ConErrorRng), Action::None);
        };
        let mode = match code {
            0 => Mode::Operational,
            1 => Mode::Maintenance,
            2 => Mode::Troubleshooting,
            3 => Mode::Simulation,
            _ => return (Reply::new(Payload::empty(), Status::ConErrorRng), Action::None),
        };
        ctx.front_end.mode.set(mode);
        (Reply::new(Payload::empty(), Status::NoError), Action::None)
    } else {
        let code = match ctx.front_end.mode.get() {
            Mode::Operational => 0u8,
            Mode::Maintenance => 1,
            Mode::Troubleshooting => 2,
            Mode::Simulation => 3,
        };
        (Reply::new(Payload::byte(code), Status::NoError), Action::None)
    }
}

/// Snapshots the PA-limits tables and IP address into a flat image and
/// writes it to the configured path (spec.md §3, §6). Cartridge ESNs
/// are not yet tracked anywhere in the registry, so the image carries
/// an empty ESN list rather than fabricated values.
fn write_nv_memory(ctx: &SpecialContext) -> (Reply, Action) {
    let tables = ctx.front_end.pa_limits.lock().unwrap();
    let pa_limits = tables
        .iter()
        .map(|pair| [pair[0].entries().to_vec(), pair[1].entries().to_vec()])
        .collect();
    drop(tables);

    let image = NvImage {
        cartridge_esn: Vec::new(),
        pa_limits,
        ip_address: *ctx.ip_address.lock().unwrap(),
    };

    match image.save(ctx.nv_image_path) {
        Ok(()) => (Reply::new(Payload::empty(), Status::NoError), Action::WriteNvMemory),
        Err(err) => {
            log::error!("failed to write non-volatile image: {err}");
            (Reply::new(Payload::empty(), Status::Error), Action::None)
        }
    }
}

fn clear_pa_limits(band: usize, ctx: &SpecialContext) -> (Reply, Action) {
    let mut tables = ctx.front_end.pa_limits.lock().unwrap();
    match tables.get_mut(band) {
        Some(pair) => {
            pair[0] = PaLimitsTable::default();
            pair[1] = PaLimitsTable::default();
            (Reply::new(Payload::empty(), Status::NoError), Action::None)
        }
        None => (Reply::new(Payload::empty(), Status::HardwRngErr), Action::None),
    }
}

/// Payload: `[pol: u8, ytoTuning: u16 BE, maxDrainVoltage: f32 BE]`,
/// `pol == 2` meaning "apply to both polarizations" (spec.md §6).
fn add_pa_limits_entry(request: &Request, band: usize, ctx: &SpecialContext) -> (Reply, Action) {
    let bytes = request.payload.as_slice();
    if bytes.len() != 7 {
        return (Reply::new(Payload::empty(), Status::ConErrorRng), Action::None);
    }
    let pol = bytes[0];
    let yto_tuning = u16::from_be_bytes([bytes[1], bytes[2]]);
    let max_drain_voltage = f32::from_be_bytes([bytes[3], bytes[4], bytes[5], bytes[6]]);

    if pol > 2 || yto_tuning > drv_lo::YTO_TUNING_MAX || !(0.0..=2.5).contains(&max_drain_voltage) {
        return (Reply::new(Payload::empty(), Status::ConErrorRng), Action::None);
    }

    let mut tables = ctx.front_end.pa_limits.lock().unwrap();
    let Some(pair) = tables.get_mut(band) else {
        return (Reply::new(Payload::empty(), Status::HardwRngErr), Action::None);
    };

    let entry = PaLimitEntry {
        yto_tuning,
        max_drain_voltage,
    };
    let targets: &[usize] = if pol == 2 { &[0, 1] } else { &[pol as usize] };
    for &index in targets {
        let mut entries = pair[index].entries().to_vec();
        entries.push(entry);
        pair[index] = PaLimitsTable::from_entries(entries);
    }
    (Reply::new(Payload::empty(), Status::NoError), Action::None)
}
