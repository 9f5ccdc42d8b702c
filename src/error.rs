//! Error types for the three layers of the crate.
//!
//! - [`TransportError`]: what the bus said.
//! - [`ProtocolError`]: what a chip driver rejected, wrapping the transport cause.
//! - [`Error`]: what the pin dispatcher reports, a stable [`ErrorCode`] plus the [`Cause`].
use core::fmt;

use embedded_hal::i2c::ErrorKind;

use crate::common::NativeError;

/// Failure of a single bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The requested bus index does not exist on this platform.
    NoSuchBus(u8),
    /// The platform could not hand out the bus.  Carries the raw OS code where there is one.
    PlatformFault(i32),
    /// The bus handle is not open.
    InvalidHandle,
    /// Device addresses are 7-bit.
    InvalidAddress(u8),
    /// A register read was requested with an empty pointer or result buffer.
    InvalidArgument,
    /// The device at this address did not acknowledge.
    SlaveNack(u8),
    /// The transaction could not be scheduled right now, retrying may succeed.
    Retryable,
    /// The platform returned something outside of the expected results.
    UnexpectedTransportResult(ErrorKind),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Retryable)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NoSuchBus(bus) => write!(f, "I2C bus {} does not exist", bus),
            TransportError::PlatformFault(code) => {
                write!(f, "platform could not open the I2C bus (code {})", code)
            }
            TransportError::InvalidHandle => write!(f, "I2C bus is not open"),
            TransportError::InvalidAddress(addr) => {
                write!(f, "invalid I2C address 0x{:02x}", addr)
            }
            TransportError::InvalidArgument => write!(f, "invalid I2C transfer arguments"),
            TransportError::SlaveNack(addr) => {
                write!(f, "no acknowledgment from device at 0x{:02x}", addr)
            }
            TransportError::Retryable => write!(f, "I2C bus temporarily unavailable"),
            TransportError::UnexpectedTransportResult(kind) => {
                write!(f, "unexpected I2C result: {:?}", kind)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

/// Failure of a chip driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    Transport(TransportError),
    /// Pin or channel index does not exist on this chip.
    InvalidIndex(u8),
    /// Output value outside of what the chip can represent.
    ValueOutOfRange(u16),
    /// Prescaler below the chip minimum.
    PrescalerOutOfRange(u8),
    /// Requested PWM frequency outside of the supported band.
    FrequencyOutOfRange(u32),
    /// Computed prescaler does not fit its register.
    PrescalerOverflow(u32),
    /// The chip returned a conversion word that is not a finished conversion.
    InvalidConversion(u16),
    /// Conversion result too far below zero to be offset noise.
    ConversionOutOfRange(i16),
}

impl From<TransportError> for ProtocolError {
    fn from(e: TransportError) -> Self {
        ProtocolError::Transport(e)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Transport(e) => write!(f, "bus error: {}", e),
            ProtocolError::InvalidIndex(index) => write!(f, "invalid pin index {}", index),
            ProtocolError::ValueOutOfRange(value) => {
                write!(f, "value {} out of range", value)
            }
            ProtocolError::PrescalerOutOfRange(value) => {
                write!(f, "prescaler {} out of range", value)
            }
            ProtocolError::FrequencyOutOfRange(hz) => {
                write!(f, "frequency {} Hz out of range", hz)
            }
            ProtocolError::PrescalerOverflow(value) => {
                write!(f, "computed prescaler {} overflows", value)
            }
            ProtocolError::InvalidConversion(raw) => {
                write!(f, "invalid conversion result 0x{:04x}", raw)
            }
            ProtocolError::ConversionOutOfRange(value) => {
                write!(f, "conversion result {} out of range", value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

/// Public error codes, one per (operation, device family) pair.
///
/// Codes 1 to 31 keep their historic numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ErrorCode {
    // init_all & deinit_all
    I2cAlreadyInitialized = 1,
    I2cAlreadyDeinitialized,
    NormalGpioInitFail,
    Pca9685InitFail,
    Ads1015InitFail,
    Mcp23008InitFail,
    Ltc2309InitFail,
    Mcp23017InitFail,
    NormalGpioDeinitFail,
    Pca9685DeinitFail,
    Ads1015DeinitFail,
    Mcp23008DeinitFail,
    Ltc2309DeinitFail,
    Mcp23017DeinitFail,
    // pin_mode
    NormalGpioSetPinModeFail,
    Mcp23008SetPinModeFail,
    Mcp23017SetPinModeFail,
    // digital_write
    NormalGpioWriteFail,
    Pca9685WriteFail,
    Mcp23008WriteFail,
    Mcp23017WriteFail,
    // analog_write
    NormalGpioPwmWriteFail,
    Pca9685PwmWriteFail,
    // analog_write_set_frequency
    NormalGpioPwmChangeFreqFail,
    Pca9685PwmChangeFreqFail,
    // digital_write_all
    Pca9685WriteAllFail,
    Mcp23008WriteAllFail,
    Mcp23017WriteAllFail,
    // digital_read_all
    Mcp23008ReadAllFail,
    Mcp23017ReadAllFail,
    // analog_write_all
    Pca9685PwmWriteAllFail,
    // bus lifecycle
    I2cInitFail,
    I2cDeinitFail,
    // digital_read
    NormalGpioReadFail,
    Mcp23008ReadFail,
    Mcp23017ReadFail,
    Ads1015ReadFail,
    Ltc2309ReadFail,
    // analog_read
    NormalGpioAnalogReadFail,
    // routing
    I2cNotConfigured,
    UnsupportedOperation,
}

impl ErrorCode {
    /// Numeric value of this code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Why a dispatcher operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cause {
    /// A chip driver failed.
    Protocol(ProtocolError),
    /// The native pin backend failed.
    Native(NativeError),
    /// The pin lives on an I2C device but no I2C bus is configured.
    BusNotConfigured,
    /// The device at this address does not support the requested operation.
    UnsupportedOperation(u8),
    AlreadyInitialized,
    AlreadyDeinitialized,
}

/// Error returned by [`ExpandedGpio`](crate::ExpandedGpio).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error {
    code: ErrorCode,
    cause: Cause,
}

impl Error {
    pub(crate) fn new(code: ErrorCode, cause: Cause) -> Self {
        Self { code, cause }
    }

    pub(crate) fn protocol(code: ErrorCode, e: ProtocolError) -> Self {
        Self::new(code, Cause::Protocol(e))
    }

    pub(crate) fn native(code: ErrorCode, e: NativeError) -> Self {
        Self::new(code, Cause::Native(e))
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn cause(&self) -> Cause {
        self.cause
    }

    /// The bus-level failure underneath this error, if any.
    pub fn transport(&self) -> Option<TransportError> {
        match self.cause {
            Cause::Protocol(ProtocolError::Transport(e)) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (code {}): ", self.code, self.code.code())?;
        match &self.cause {
            Cause::Protocol(e) => write!(f, "{}", e),
            Cause::Native(e) => write!(f, "native GPIO error {}", e.0),
            Cause::BusNotConfigured => write!(f, "pin requires an I2C bus that is not configured"),
            Cause::UnsupportedOperation(addr) => {
                write!(f, "device at 0x{:02x} does not support this operation", addr)
            }
            Cause::AlreadyInitialized => write!(f, "already initialized"),
            Cause::AlreadyDeinitialized => write!(f, "already deinitialized"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Cause::Protocol(e) => Some(e),
            _ => None,
        }
    }
}
