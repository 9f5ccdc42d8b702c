//! Pin identifiers.
//!
//! A pin is a single `u32`.  Bits 8..16 hold the I2C address of the device the pin lives
//! on and bits 0..8 the pin index on that device.  A zero device byte means the pin
//! belongs to the controller itself, and the whole value is its native pin number.

/// Raw pin identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(pub u32);

impl Pin {
    /// Pin `index` of the device at `address`.
    pub const fn new(address: u8, index: u8) -> Self {
        Self(((address as u32) << 8) | index as u32)
    }

    pub const fn device_address(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn index(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_native(self) -> bool {
        self.device_address() == 0
    }
}

impl From<u32> for Pin {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Pin> for u32 {
    fn from(pin: Pin) -> u32 {
        pin.0
    }
}

/// Kind of I2C peripheral a device address was registered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralClass {
    /// PCA9685 16-channel PWM driver.
    Pwm,
    /// MCP23008 8-pin expander.
    Digital8,
    /// MCP23017 16-pin expander.
    Digital16,
    /// ADS1015 4-channel ADC.
    AdcSingleEnded,
    /// LTC2309 8-channel ADC.
    AdcMultiplexed,
}

impl PeripheralClass {
    /// Bring-up order used by [`ExpandedGpio::init_all`](crate::ExpandedGpio::init_all).
    pub const ALL: [PeripheralClass; 5] = [
        PeripheralClass::Pwm,
        PeripheralClass::Digital8,
        PeripheralClass::Digital16,
        PeripheralClass::AdcSingleEnded,
        PeripheralClass::AdcMultiplexed,
    ];
}

/// A pin after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinAddress {
    /// Native controller pin, carrying the full pin number.
    Native(u32),
    Device {
        class: PeripheralClass,
        address: u8,
        index: u8,
    },
}

impl PinAddress {
    pub fn encode(&self) -> Pin {
        match *self {
            PinAddress::Native(raw) => Pin(raw),
            PinAddress::Device { address, index, .. } => Pin::new(address, index),
        }
    }
}

impl From<PinAddress> for Pin {
    fn from(addr: PinAddress) -> Pin {
        addr.encode()
    }
}
