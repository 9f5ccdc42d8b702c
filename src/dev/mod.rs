//! The device module contains the register protocols of each supported peripheral.
//!
//! In most cases you will not need anything from here explicitly, [`ExpandedGpio`](crate::ExpandedGpio)
//! picks the right driver for a pin.  The drivers are cheap to construct from a bus and an
//! address, so they can also be used on their own.

pub mod ads1015;
pub mod ltc2309;
pub mod mcp23008;
pub mod mcp23017;
pub mod pca9685;
