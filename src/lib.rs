//! Unified pin access for industrial controllers.
//!
//! Pins on the controller itself and pins on I2C peripherals share one `u32` pin space
//! (see [`Pin`]).  [`ExpandedGpio`] decodes a pin, finds the chip it lives on through the
//! [`Config`] registry and runs the operation on the native backend or the chip driver:
//!
//! - PCA9685 16-channel PWM driver
//! - MCP23008 and MCP23017 digital expanders
//! - ADS1015 and LTC2309 ADCs
//!
//! ```
//! use embedded_hal_mock::eh1::{delay::NoopDelay, i2c};
//! use plc_peripherals::{Config, Direction, ExpandedGpio, NativeError, NativeGpio, Pin};
//!
//! struct NoNativePins;
//!
//! impl NativeGpio for NoNativePins {
//!     fn init(&mut self) -> Result<(), NativeError> { Ok(()) }
//!     fn deinit(&mut self) -> Result<(), NativeError> { Ok(()) }
//!     fn set_pin_mode(&mut self, _: u32, _: Direction) -> Result<(), NativeError> { Err(NativeError(-1)) }
//!     fn write(&mut self, _: u32, _: bool) -> Result<(), NativeError> { Err(NativeError(-1)) }
//!     fn read(&mut self, _: u32) -> Result<bool, NativeError> { Err(NativeError(-1)) }
//!     fn pwm_write(&mut self, _: u32, _: u16) -> Result<(), NativeError> { Err(NativeError(-1)) }
//!     fn pwm_frequency(&mut self, _: u32, _: u32) -> Result<(), NativeError> { Err(NativeError(-1)) }
//!     fn analog_read(&mut self, _: u32) -> Result<u16, NativeError> { Err(NativeError(-1)) }
//! }
//!
//! // A config without a bus only reaches native pins.
//! let platform = |_bus: u8| -> Result<i2c::Mock, plc_peripherals::TransportError> {
//!     Ok(i2c::Mock::new(&[]))
//! };
//! let mut gpio = ExpandedGpio::new(Config::new(None), platform, NoNativePins, NoopDelay::new());
//! gpio.init_all(false)?;
//! assert!(gpio.is_initialized());
//! assert!(gpio.digital_write(Pin::new(0x20, 1), true).is_err());
//! gpio.deinit_all()?;
//! # Ok::<(), plc_peripherals::Error>(())
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod bus;
mod common;
mod config;
pub mod dev;
mod driver;
mod error;
mod gpio;
#[cfg(feature = "linux")]
mod linux;
mod mutex;
mod pin;

pub use bus::{Bus, I2cPlatform, Transport};
pub use common::{Direction, Lifecycle, NativeError, NativeGpio, Transition};
pub use config::{
    Config, ConfigError, DEFAULT_SETTLE_DELAY_MS, MAX_ADC_MULTIPLEXED_DEVICES,
    MAX_ADC_SINGLE_ENDED_DEVICES, MAX_DIGITAL16_DEVICES, MAX_DIGITAL8_DEVICES, MAX_PWM_DEVICES,
    NO_I2C_BUS,
};
pub use driver::{Driver, PortRegs};
pub use error::{Cause, Error, ErrorCode, ProtocolError, TransportError};
pub use gpio::{ExpandedGpio, ADS1015_DIGITAL_THRESHOLD, LTC2309_DIGITAL_THRESHOLD};
#[cfg(feature = "linux")]
pub use linux::LinuxI2c;
pub use mutex::GpioMutex;
pub use pin::{PeripheralClass, Pin, PinAddress};

pub use dev::ads1015::Ads1015;
pub use dev::ltc2309::Ltc2309;
pub use dev::mcp23008::Mcp23008;
pub use dev::mcp23017::Mcp23017;
pub use dev::pca9685::Pca9685;

/// Library version, `major.minor.patch`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
pub const VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
pub const VERSION_PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");

pub const VERSION_MAJOR_NUM: u32 = parse_version_part(VERSION_MAJOR);
pub const VERSION_MINOR_NUM: u32 = parse_version_part(VERSION_MINOR);
pub const VERSION_PATCH_NUM: u32 = parse_version_part(VERSION_PATCH);

const fn parse_version_part(part: &str) -> u32 {
    let digits = part.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < digits.len() {
        value = value * 10 + (digits[i] - b'0') as u32;
        i += 1;
    }
    value
}
