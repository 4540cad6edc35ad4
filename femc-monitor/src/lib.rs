//! The three background monitor loops (spec.md §4.5), each its own
//! `std::thread`, stopped cooperatively via a shared `AtomicBool`
//! (the teacher's per-task main loops never stop, since a Hubris task
//! simply never returns; a hosted process needs a way to shut them
//! down cleanly instead).

pub mod cartridge_sweep;
pub mod cryostat_sweep;
pub mod fetim_sweep;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;

use drv_cryostat::CryostatDriver;
use drv_fetim::FetimDriver;
use drv_lo::LoDriver;
use drv_powerdist::PowerDistDriver;
use femc_registry::FrontEnd;

pub struct Monitors {
    pub running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Monitors {
    pub fn spawn(
        registry: Arc<FrontEnd>,
        cryostat: Arc<dyn CryostatDriver>,
        lo: Arc<dyn LoDriver>,
        power: Arc<dyn PowerDistDriver>,
        fetim: Arc<dyn FetimDriver>,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let mut handles = Vec::new();

        {
            let registry = registry.clone();
            let running = running.clone();
            handles.push(
                std::thread::Builder::new()
                    .name("cryostat-sweep".into())
                    .spawn(move || cryostat_sweep::run(registry, cryostat, running))
                    .expect("spawn cryostat sweep thread"),
            );
        }
        {
            let registry = registry.clone();
            let running = running.clone();
            handles.push(
                std::thread::Builder::new()
                    .name("cartridge-sweep".into())
                    .spawn(move || cartridge_sweep::run(registry, lo, power, running))
                    .expect("spawn cartridge sweep thread"),
            );
        }
        {
            let running = running.clone();
            handles.push(
                std::thread::Builder::new()
                    .name("fetim-sweep".into())
                    .spawn(move || fetim_sweep::run(registry, fetim, running))
                    .expect("spawn fetim sweep thread"),
            );
        }

        Self { running, handles }
    }

    /// Signals every sweep loop to stop at its next iteration boundary
    /// and joins all three threads.
    pub fn shutdown(mut self) {
        self.running.store(false, std::sync::atomic::Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
