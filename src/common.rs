use embedded_hal::delay::DelayNs;

use crate::ProtocolError;

/// Direction of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Result of an idempotent init or deinit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// The chip was reprogrammed.
    Performed,
    /// The chip registers already matched the target state, nothing was written.
    AlreadyInState,
}

/// Init/deinit capability shared by every chip driver.
pub trait Lifecycle {
    /// Bring the chip into its operating configuration.
    ///
    /// Chips whose state can be detected from their registers must return
    /// [`Transition::AlreadyInState`] without writing anything when they are already
    /// configured.  A failing sub-step is returned as is, there is no rollback.
    fn init(&mut self, delay: &mut impl DelayNs) -> Result<Transition, ProtocolError>;

    /// Return the chip to its factory defaults.
    fn deinit(&mut self) -> Result<Transition, ProtocolError>;
}

/// Failure reported by the native pin backend.
///
/// The value is backend defined and only passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NativeError(pub i32);

/// Direct access to the pins of the controller itself.
///
/// `pin` is the full pin identifier with a zero device byte, see [`Pin`](crate::Pin).
pub trait NativeGpio {
    fn init(&mut self) -> Result<(), NativeError>;
    fn deinit(&mut self) -> Result<(), NativeError>;

    fn set_pin_mode(&mut self, pin: u32, dir: Direction) -> Result<(), NativeError>;

    fn write(&mut self, pin: u32, value: bool) -> Result<(), NativeError>;
    fn read(&mut self, pin: u32) -> Result<bool, NativeError>;

    fn pwm_write(&mut self, pin: u32, value: u16) -> Result<(), NativeError>;
    fn pwm_frequency(&mut self, pin: u32, hz: u32) -> Result<(), NativeError>;

    fn analog_read(&mut self, pin: u32) -> Result<u16, NativeError>;
}
