//! Per-cartridge LO (local oscillator) and bias device state (spec.md
//! §3, §4.1).

use femc_abi::shadow::Shadow;
use std::sync::Mutex;

pub const CARTRIDGES_NUMBER: usize = 10;
pub const LNA_STAGES_NUMBER: usize = 3;
pub const SIS_MIXERS_NUMBER: usize = 2;

#[derive(Clone, Default, Debug)]
pub struct LnaStage {
    pub drain_voltage: Shadow<f32>,
    pub drain_current: Shadow<f32>,
    pub gate_voltage: f32,
}

#[derive(Clone, Default, Debug)]
pub struct SisMixer {
    pub voltage: Shadow<f32>,
    pub current: f32,
    pub open_loop: Shadow<bool>,
}

#[derive(Clone, Default, Debug)]
pub struct SisMagnet {
    pub available: bool,
    pub voltage: f32,
    pub current: Shadow<f32>,
}

#[derive(Clone, Default, Debug)]
pub struct SisHeater {
    pub available: bool,
    pub enable: Shadow<bool>,
    pub current: f32,
}

#[derive(Clone, Default, Debug)]
pub struct LnaLed {
    pub enable: Shadow<bool>,
}

/// Polarization-indexed bias state for one cartridge (spec.md §4.1).
/// Each field group is behind its own mutex, coarse-grained at the
/// submodule rather than the single-value level, matching the
/// "mutex per subtree" model of spec.md §5.
pub struct Polarization {
    pub lna: Mutex<[LnaStage; LNA_STAGES_NUMBER]>,
    pub lna_enable: Mutex<Shadow<bool>>,
    pub sis: Mutex<[SisMixer; SIS_MIXERS_NUMBER]>,
    pub sis_magnet: Mutex<[SisMagnet; SIS_MIXERS_NUMBER]>,
    pub sis_heater: Mutex<SisHeater>,
    pub lna_led: Mutex<LnaLed>,
}

impl Default for Polarization {
    fn default() -> Self {
        Self {
            lna: Mutex::new(Default::default()),
            lna_enable: Mutex::new(Shadow::default()),
            sis: Mutex::new(Default::default()),
            sis_magnet: Mutex::new(Default::default()),
            sis_heater: Mutex::new(SisHeater::default()),
            lna_led: Mutex::new(LnaLed::default()),
        }
    }
}

#[derive(Default)]
pub struct Bias {
    pub polarizations: [Polarization; 2],
}

/// Power amplifier drain bias, clamped per spec.md §4.7's PA-limits
/// table and tripped by the 30K cartridge-temperature interlock.
#[derive(Default)]
pub struct PowerAmplifier {
    pub drain_voltage: Shadow<f32>,
    pub drain_current: f32,
    pub gate_voltage: Shadow<f32>,
}

/// YIG-tuned LO chain. `yto_tuning` is the value the PA-limits table is
/// keyed on (spec.md §4.7).
pub struct Lo {
    pub yto_tuning: Mutex<u16>,
    pub yto_tuning_shadow: Mutex<Shadow<u16>>,
    pub photomixer_enable: Mutex<Shadow<bool>>,
    pub pll_lock_detect: Mutex<bool>,
    pub pll_correction_voltage: Mutex<f32>,
    pub pa_pol: [PowerAmplifier; 2],
    /// Reference ESN identifying the PA-limits table this band's LO
    /// was characterized against (spec.md §3, §6).
    pub pa_limits_esn: Mutex<[u8; 8]>,
}

impl Default for Lo {
    fn default() -> Self {
        Self {
            yto_tuning: Mutex::new(0),
            yto_tuning_shadow: Mutex::new(Shadow::default()),
            photomixer_enable: Mutex::new(Shadow::default()),
            pll_lock_detect: Mutex::new(false),
            pll_correction_voltage: Mutex::new(0.0),
            pa_pol: Default::default(),
            pa_limits_esn: Mutex::new([0; 8]),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CartridgeBand {
    Band1,
    Band2,
    Band3,
    Band4,
    Band5,
    Band6,
    Band7,
    Band8,
    Band9,
    Band10,
}

impl CartridgeBand {
    pub fn from_index(index: usize) -> Option<Self> {
        use CartridgeBand::*;
        const ALL: [CartridgeBand; 10] = [
            Band1, Band2, Band3, Band4, Band5, Band6, Band7, Band8, Band9, Band10,
        ];
        ALL.get(index).copied()
    }
}

pub struct Cartridge {
    pub band: CartridgeBand,
    pub lo: Lo,
    pub bias: Bias,
    /// True once ESN-backed hardware presence has been confirmed;
    /// control/monitor requests against an absent cartridge return
    /// `HARDW_ERROR` without touching the bus (spec.md §4.3).
    pub present: Mutex<bool>,
    /// Set while the cartridge sits in the reduced-power standby2
    /// state; while set, LNA LED enable and SIS magnet current writes
    /// are refused with `HARDW_BLKD_ERR` (spec.md §4.7).
    pub standby2: Mutex<bool>,
    /// PA assembly temperature, read by the cartridge sweep and
    /// checked against `PA_MAX_ALLOWED_TEMP` (spec.md §4.7).
    pub pa_temperature: Mutex<f32>,
    /// Band-7-only Teledyne PA chip presence flag; writable only when
    /// `band == Band7` (spec.md §3, §4.1).
    pub has_teledyne_pa: Mutex<bool>,
}

impl Cartridge {
    fn new(band: CartridgeBand) -> Self {
        Self {
            band,
            lo: Lo::default(),
            bias: Bias::default(),
            present: Mutex::new(false),
            standby2: Mutex::new(false),
            pa_temperature: Mutex::new(0.0),
            has_teledyne_pa: Mutex::new(false),
        }
    }

    pub fn is_present(&self) -> bool {
        *self.present.lock().unwrap()
    }
}

pub fn new_cartridges() -> Vec<Cartridge> {
    (0..CARTRIDGES_NUMBER)
        .map(|i| Cartridge::new(CartridgeBand::from_index(i).unwrap()))
        .collect()
}
