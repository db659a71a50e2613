//! Drive and sense GPIO lines through the Linux sysfs interface
//! (`/sys/class/gpio`).
//!
//! Pins are exported on demand, the direction is applied on every
//! [`PinController::set`], and levels are read back with
//! [`PinController::get`]. Pins outside [`PIN_RANGE`] are silently ignored.

pub mod gpio;
pub mod sysfs;
pub mod tokens;

pub use gpio::{Direction, Level, LineMode, PinController, RetryPolicy, PIN_RANGE};
pub use sysfs::{Sysfs, SysfsNodes, SYSFS_ROOT};
pub use tokens::{parse_pin, MODE_TOKENS};
