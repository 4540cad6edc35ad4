//! FETIM sweep (spec.md §4.5): polls the interlock sensors and latches
//! the shutdown trigger the first time a multi-sensor fault is seen
//! (spec.md §4.5 edge cases).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use drv_fetim::FetimDriver;
use femc_registry::fetim::INTERLOCK_TEMP_SENSORS_NUMBER;
use femc_registry::FrontEnd;

pub const SWEEP_PERIOD: Duration = Duration::from_millis(500);

pub fn run(registry: Arc<FrontEnd>, driver: Arc<dyn FetimDriver>, running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        sweep_once(&registry, driver.as_ref());
        std::thread::sleep(SWEEP_PERIOD);
    }
}

pub fn sweep_once(registry: &FrontEnd, driver: &dyn FetimDriver) {
    if !*registry.fetim.available.lock().unwrap() {
        return;
    }

    let mut temps = [0.0f32; INTERLOCK_TEMP_SENSORS_NUMBER];
    for (i, temp) in temps.iter_mut().enumerate() {
        if let Ok(reading) = driver.read_interlock_temperature(i) {
            *temp = reading;
        }
    }
    *registry.fetim.interlock.temperature.lock().unwrap() = temps;

    if let Ok(flow) = driver.read_interlock_flow() {
        *registry.fetim.interlock.flow.lock().unwrap() = flow;
    }

    if let Ok((single_fail, multi_fail)) = driver.read_interlock_faults() {
        *registry.fetim.interlock.single_fail.lock().unwrap() = single_fail;
        *registry.fetim.interlock.multi_fail.lock().unwrap() = multi_fail;
        if multi_fail {
            let mut trigger = registry.fetim.interlock.shutdown_trigger.lock().unwrap();
            if !*trigger {
                log::error!("FETIM interlock multi-sensor fault, latching shutdown trigger");
            }
            *trigger = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drv_fetim::SimulatedFetim;

    #[test]
    fn sweep_is_a_no_op_when_fetim_is_absent() {
        let registry = FrontEnd::new();
        let driver = SimulatedFetim::default();
        sweep_once(&registry, &driver);
        assert_eq!(*registry.fetim.interlock.flow.lock().unwrap(), 0.0);
    }

    #[test]
    fn sweep_populates_readings_when_present() {
        let registry = FrontEnd::new();
        *registry.fetim.available.lock().unwrap() = true;
        let driver = SimulatedFetim::default();
        sweep_once(&registry, &driver);
        assert!(*registry.fetim.interlock.flow.lock().unwrap() > 0.0);
    }
}
