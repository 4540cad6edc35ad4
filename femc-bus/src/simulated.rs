//! In-memory fake bus backend, selected when the front end is in
//! `SIMULATION_MODE` (spec.md §4.8) or under test. Drivers see the same
//! `BusBackend` trait as the hardware path; no bus traffic is ever
//! generated.

use std::collections::HashMap;

use crate::error::BusError;
use crate::transport::BusBackend;

#[derive(Default)]
pub struct SimulatedBus {
    /// Canned responses keyed by command byte.
    responses: HashMap<u8, (u32, u32)>,
    /// Commands that should report a timeout the next time they're used.
    timeouts: HashMap<u8, bool>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&mut self, command: u8, data: (u32, u32)) {
        self.responses.insert(command, data);
    }

    /// Makes the next `transact` call for `command` fail with
    /// `BusError::Timeout`, for exercising spec.md §8 scenario 4 (gate
    /// valve monitor during a serial error).
    pub fn inject_timeout(&mut self, command: u8) {
        self.timeouts.insert(command, true);
    }
}

impl BusBackend for SimulatedBus {
    fn transact(&mut self, command: u8, _length: u8, _data: u32) -> Result<(u32, u32), BusError> {
        if let Some(pending) = self.timeouts.get_mut(&command) {
            if *pending {
                *pending = false;
                return Err(BusError::Timeout);
            }
        }
        Ok(self.responses.get(&command).copied().unwrap_or((0, 0)))
    }
}
