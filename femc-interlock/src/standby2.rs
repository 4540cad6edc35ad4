//! Standby2 entry/exit (spec.md §4.7). Entering or leaving standby2 is
//! unconditional; it's writes against the LNA LED and SIS magnet that
//! are refused *while* a cartridge sits in standby2 (enforced by the
//! `femc-router` handlers for those two points, grounded on
//! `original_source/src/lnaLed.c`'s `if (frontend.cartridge[...].standby2)
//! return HARDW_BLKD_ERR` guard).

use femc_registry::Cartridge;

pub fn enter_standby2(cartridge: &Cartridge) {
    *cartridge.standby2.lock().unwrap() = true;
}

pub fn leave_standby2(cartridge: &Cartridge) {
    *cartridge.standby2.lock().unwrap() = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use femc_registry::cartridge::CartridgeBand;

    fn fresh_cartridge() -> Cartridge {
        femc_registry::cartridge::new_cartridges()
            .into_iter()
            .find(|c| c.band == CartridgeBand::Band1)
            .unwrap()
    }

    #[test]
    fn enter_and_leave_toggle_the_flag() {
        let cartridge = fresh_cartridge();
        enter_standby2(&cartridge);
        assert!(*cartridge.standby2.lock().unwrap());
        leave_standby2(&cartridge);
        assert!(!*cartridge.standby2.lock().unwrap());
    }
}
