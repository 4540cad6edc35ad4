//! Front-end operating mode (spec.md §4.8).

use std::sync::RwLock;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
    Operational,
    Maintenance,
    Troubleshooting,
    Simulation,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Operational
    }
}

pub struct ModeCell(RwLock<Mode>);

impl Default for ModeCell {
    fn default() -> Self {
        Self(RwLock::new(Mode::default()))
    }
}

impl ModeCell {
    pub fn get(&self) -> Mode {
        *self.0.read().unwrap()
    }

    pub fn set(&self, mode: Mode) {
        *self.0.write().unwrap() = mode;
    }

    pub fn is_maintenance(&self) -> bool {
        self.get() == Mode::Maintenance
    }

    pub fn is_troubleshooting(&self) -> bool {
        self.get() == Mode::Troubleshooting
    }

    pub fn is_simulation(&self) -> bool {
        self.get() == Mode::Simulation
    }
}
