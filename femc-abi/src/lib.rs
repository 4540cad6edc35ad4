//! Shared wire format, status codes and record types for the front-end
//! monitor-and-control firmware. Every other crate in the workspace
//! depends on this one; it has no knowledge of any particular bus,
//! driver or subsystem.

pub mod address;
pub mod message;
pub mod shadow;
pub mod status;
pub mod wire;

pub use address::Class;
pub use message::{Reply, Request};
pub use shadow::{Shadow, WireValue};
pub use status::{ErrorKind, ModuleId, Status};
pub use wire::Payload;
