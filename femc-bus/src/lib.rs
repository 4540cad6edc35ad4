//! Memory-mapped register access and bus mutual exclusion (spec.md
//! §4.2, §5, §6). Device-specific command encodings live in the `drv-*`
//! crates; this crate only knows how to move bytes across a port and
//! serialize access to it.

pub mod error;
pub mod hardware;
pub mod owb;
pub mod regs;
pub mod simulated;
pub mod transport;

pub use error::BusError;
pub use hardware::HardwareBus;
pub use owb::{OneWireBus, OwbBackend, SimulatedOwb};
pub use simulated::SimulatedBus;
pub use transport::{Bus, BusBackend};
