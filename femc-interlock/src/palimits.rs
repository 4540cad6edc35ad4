//! PA-limits lookup (spec.md §4.7, restated precisely in SPEC_FULL.md
//! §4.7): on retune, find the bounding table entries around the new
//! `ytoTuning` and clamp to the more conservative (lower) of the two.

use femc_registry::palimits::{PaLimitEntry, PaLimitsTable};

/// The effective drain-voltage ceiling at `yto_tuning`, or `None` if the
/// table has no entries at all (no limit is enforced; spec.md leaves
/// the unpopulated-table case as "no clamp").
pub fn max_drain_voltage(table: &PaLimitsTable, yto_tuning: u16) -> Option<f32> {
    let entries = table.entries();
    if entries.is_empty() {
        return None;
    }

    let lower = entries
        .iter()
        .filter(|e| e.yto_tuning <= yto_tuning)
        .max_by_key(|e| e.yto_tuning);
    let upper = entries
        .iter()
        .filter(|e| e.yto_tuning >= yto_tuning)
        .min_by_key(|e| e.yto_tuning);

    match (lower, upper) {
        (Some(l), Some(u)) => Some(l.max_drain_voltage.min(u.max_drain_voltage)),
        (Some(l), None) => Some(l.max_drain_voltage),
        (None, Some(u)) => Some(u.max_drain_voltage),
        (None, None) => None,
    }
}

/// Clamps a requested drain voltage to the table's limit at the given
/// tuning, returning the value actually applied.
pub fn clamp(table: &PaLimitsTable, yto_tuning: u16, requested: f32) -> f32 {
    match max_drain_voltage(table, yto_tuning) {
        Some(limit) => requested.min(limit),
        None => requested,
    }
}

#[allow(dead_code)]
fn entry(yto_tuning: u16, max_drain_voltage: f32) -> PaLimitEntry {
    PaLimitEntry {
        yto_tuning,
        max_drain_voltage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PaLimitsTable {
        PaLimitsTable::from_entries(vec![
            entry(0, 2.0),
            entry(1000, 1.5),
            entry(4095, 0.5),
        ])
    }

    #[test]
    fn exact_match_uses_that_entry() {
        assert_eq!(max_drain_voltage(&table(), 1000), Some(1.5));
    }

    #[test]
    fn between_entries_takes_the_lower_bound() {
        // Bounded by (0, 2.0) and (1000, 1.5); conservative choice is 1.5.
        assert_eq!(max_drain_voltage(&table(), 500), Some(1.5));
    }

    #[test]
    fn below_first_entry_uses_only_bound() {
        assert_eq!(max_drain_voltage(&table(), 0), Some(2.0));
    }

    #[test]
    fn empty_table_has_no_limit() {
        assert_eq!(max_drain_voltage(&PaLimitsTable::default(), 2000), None);
    }

    #[test]
    fn clamp_never_exceeds_limit() {
        assert_eq!(clamp(&table(), 500, 3.0), 1.5);
        assert_eq!(clamp(&table(), 500, 1.0), 1.0);
    }
}
