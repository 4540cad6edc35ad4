//! The set of device drivers the router dispatches leaf handlers
//! against. Built once at startup (either all `Hardware*` or all
//! `Simulated*`, per spec.md §4.8's `SIMULATION_MODE`) and shared
//! behind `Arc` alongside the registry.

use std::sync::Arc;

use drv_bias::BiasDriver;
use drv_cryostat::CryostatDriver;
use drv_fetim::FetimDriver;
use drv_ifswitch::IfSwitchDriver;
use drv_lo::LoDriver;
use drv_lpr::LprDriver;
use drv_powerdist::PowerDistDriver;

pub struct Drivers {
    pub lo: Arc<dyn LoDriver>,
    pub bias: Arc<dyn BiasDriver>,
    pub power: Arc<dyn PowerDistDriver>,
    pub if_switch: Arc<dyn IfSwitchDriver>,
    pub cryostat: Arc<dyn CryostatDriver>,
    pub lpr: Arc<dyn LprDriver>,
    pub fetim: Arc<dyn FetimDriver>,
}

impl Drivers {
    pub fn simulated() -> Self {
        Self {
            lo: Arc::new(drv_lo::SimulatedLo::default()),
            bias: Arc::new(drv_bias::SimulatedBias),
            power: Arc::new(drv_powerdist::SimulatedPowerDist),
            if_switch: Arc::new(drv_ifswitch::SimulatedIfSwitch),
            cryostat: Arc::new(drv_cryostat::SimulatedCryostat),
            lpr: Arc::new(drv_lpr::SimulatedLpr),
            fetim: Arc::new(drv_fetim::SimulatedFetim),
        }
    }
}
