use core::fmt;

use crate::PeripheralClass;

/// Bus id meaning "no I2C bus on this controller".
pub const NO_I2C_BUS: u8 = 0xff;

/// PCA9685 address pins reach 64 addresses, two of them are reserved.
pub const MAX_PWM_DEVICES: usize = 62;
/// MCP23008 and MCP23017 have three address pins each.
pub const MAX_DIGITAL8_DEVICES: usize = 8;
pub const MAX_DIGITAL16_DEVICES: usize = 8;
/// ADS1015 selects one of four addresses through its ADDR pin.
pub const MAX_ADC_SINGLE_ENDED_DEVICES: usize = 4;
/// LTC2309 has two three-state address pins.
pub const MAX_ADC_MULTIPLEXED_DEVICES: usize = 9;

/// Settle time between expander and ADC bring-up.
pub const DEFAULT_SETTLE_DELAY_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Device addresses are 7-bit and address 0 is reserved for native pins.
    InvalidAddress(u8),
    /// The address is already registered.
    DuplicateAddress(u8),
    /// No room left in the list of this class.
    TooManyDevices(PeripheralClass),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddress(addr) => {
                write!(f, "invalid device address 0x{:02x}", addr)
            }
            ConfigError::DuplicateAddress(addr) => {
                write!(f, "device address 0x{:02x} registered twice", addr)
            }
            ConfigError::TooManyDevices(class) => {
                write!(f, "too many {:?} devices", class)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Bus and device layout of a controller.
///
/// ```
/// use plc_peripherals::{Config, PeripheralClass};
///
/// let config = Config::new(Some(1))
///     .with_device(PeripheralClass::Digital16, 0x20)?
///     .with_device(PeripheralClass::Pwm, 0x40)?
///     .with_settle_delay_ms(10);
/// assert_eq!(config.class_of(0x20), Some(PeripheralClass::Digital16));
/// # Ok::<(), plc_peripherals::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bus: Option<u8>,
    pwm: heapless::Vec<u8, MAX_PWM_DEVICES>,
    digital8: heapless::Vec<u8, MAX_DIGITAL8_DEVICES>,
    digital16: heapless::Vec<u8, MAX_DIGITAL16_DEVICES>,
    adc_single_ended: heapless::Vec<u8, MAX_ADC_SINGLE_ENDED_DEVICES>,
    adc_multiplexed: heapless::Vec<u8, MAX_ADC_MULTIPLEXED_DEVICES>,
    settle_delay_ms: u32,
}

impl Config {
    /// Empty configuration on `bus`, or without any I2C bus for `None`.
    pub fn new(bus: Option<u8>) -> Self {
        Self {
            bus,
            pwm: heapless::Vec::new(),
            digital8: heapless::Vec::new(),
            digital16: heapless::Vec::new(),
            adc_single_ended: heapless::Vec::new(),
            adc_multiplexed: heapless::Vec::new(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }

    /// Like [`Config::new`], with [`NO_I2C_BUS`] standing for no bus.
    pub fn from_bus_id(bus_id: u8) -> Self {
        Self::new(if bus_id == NO_I2C_BUS {
            None
        } else {
            Some(bus_id)
        })
    }

    pub fn with_device(mut self, class: PeripheralClass, addr: u8) -> Result<Self, ConfigError> {
        self.add_device(class, addr)?;
        Ok(self)
    }

    pub fn add_device(&mut self, class: PeripheralClass, addr: u8) -> Result<(), ConfigError> {
        if addr == 0 || addr >= 128 {
            return Err(ConfigError::InvalidAddress(addr));
        }
        if self.class_of(addr).is_some() {
            return Err(ConfigError::DuplicateAddress(addr));
        }
        let pushed = match class {
            PeripheralClass::Pwm => self.pwm.push(addr),
            PeripheralClass::Digital8 => self.digital8.push(addr),
            PeripheralClass::Digital16 => self.digital16.push(addr),
            PeripheralClass::AdcSingleEnded => self.adc_single_ended.push(addr),
            PeripheralClass::AdcMultiplexed => self.adc_multiplexed.push(addr),
        };
        pushed.map_err(|_| ConfigError::TooManyDevices(class))
    }

    pub fn with_settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    pub fn bus(&self) -> Option<u8> {
        self.bus
    }

    pub fn settle_delay_ms(&self) -> u32 {
        self.settle_delay_ms
    }

    /// Addresses registered for `class`, in registration order.
    pub fn devices(&self, class: PeripheralClass) -> &[u8] {
        match class {
            PeripheralClass::Pwm => &self.pwm,
            PeripheralClass::Digital8 => &self.digital8,
            PeripheralClass::Digital16 => &self.digital16,
            PeripheralClass::AdcSingleEnded => &self.adc_single_ended,
            PeripheralClass::AdcMultiplexed => &self.adc_multiplexed,
        }
    }

    /// How many devices of `class` fit, one per address the chip can be strapped to.
    pub const fn capacity(class: PeripheralClass) -> usize {
        match class {
            PeripheralClass::Pwm => MAX_PWM_DEVICES,
            PeripheralClass::Digital8 => MAX_DIGITAL8_DEVICES,
            PeripheralClass::Digital16 => MAX_DIGITAL16_DEVICES,
            PeripheralClass::AdcSingleEnded => MAX_ADC_SINGLE_ENDED_DEVICES,
            PeripheralClass::AdcMultiplexed => MAX_ADC_MULTIPLEXED_DEVICES,
        }
    }

    /// First of `classes` whose list contains `addr`.
    pub fn find(&self, addr: u8, classes: &[PeripheralClass]) -> Option<PeripheralClass> {
        classes
            .iter()
            .copied()
            .find(|&class| self.devices(class).contains(&addr))
    }

    /// Class `addr` is registered as, if any.
    pub fn class_of(&self, addr: u8) -> Option<PeripheralClass> {
        self.find(addr, &PeripheralClass::ALL)
    }
}
