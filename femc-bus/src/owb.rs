//! The one-wire bus, used to read device ESN/ID strings. There is a
//! single physical OWB controller in the front end, so a single mutex
//! covers the whole bus (spec.md §5).

use std::sync::Mutex;

use crate::error::BusError;

pub trait OwbBackend: Send {
    fn read_id(&mut self, device: u8) -> Result<[u8; 8], BusError>;
}

pub struct OneWireBus {
    backend: Mutex<Box<dyn OwbBackend>>,
}

impl OneWireBus {
    pub fn new(backend: Box<dyn OwbBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    pub fn read_id(&self, device: u8) -> Result<[u8; 8], BusError> {
        self.backend.lock().unwrap().read_id(device)
    }
}

/// Simulated OWB controller returning a fixed table of IDs.
#[derive(Default)]
pub struct SimulatedOwb {
    ids: std::collections::HashMap<u8, [u8; 8]>,
}

impl SimulatedOwb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_id(&mut self, device: u8, id: [u8; 8]) {
        self.ids.insert(device, id);
    }
}

impl OwbBackend for SimulatedOwb {
    fn read_id(&mut self, device: u8) -> Result<[u8; 8], BusError> {
        self.ids.get(&device).copied().ok_or(BusError::DeviceFault)
    }
}
