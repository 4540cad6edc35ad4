//! Safety interlocks (spec.md §4.7): PA-limits clamping, the cartridge
//! temperature trip, and standby2 enter/leave.

pub mod palimits;
pub mod standby2;
pub mod temperature;

pub use palimits::{clamp, max_drain_voltage};
pub use standby2::{enter_standby2, leave_standby2};
pub use temperature::{temperature_trips_interlock, PA_MAX_ALLOWED_TEMP};
