//! Per-cartridge, per-polarization PA-limits table: bounds the drain
//! voltage the LO's power amplifier may be set to at a given YTO tuning
//! word (spec.md §4.7). Lookup logic itself lives in `femc-interlock`;
//! this module only owns the table's storage and entry shape.

#[derive(Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PaLimitEntry {
    pub yto_tuning: u16,
    pub max_drain_voltage: f32,
}

#[derive(Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct PaLimitsTable {
    /// Kept sorted ascending by `yto_tuning`; populated from the
    /// configuration file at startup (spec.md §4.6, §6).
    entries: Vec<PaLimitEntry>,
}

impl PaLimitsTable {
    pub fn from_entries(mut entries: Vec<PaLimitEntry>) -> Self {
        entries.sort_by_key(|e| e.yto_tuning);
        Self { entries }
    }

    pub fn entries(&self) -> &[PaLimitEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
