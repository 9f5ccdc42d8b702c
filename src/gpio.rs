//! Pin dispatcher.
//!
//! [`ExpandedGpio`] owns the I2C bus, the native pin backend and the device layout, and
//! forwards every pin operation to whatever the pin lives on.
use embedded_hal::delay::DelayNs;

use crate::dev::ads1015::Ads1015;
use crate::dev::ltc2309::Ltc2309;
use crate::dev::mcp23008::Mcp23008;
use crate::dev::mcp23017::Mcp23017;
use crate::dev::pca9685::Pca9685;
use crate::{
    Bus, Cause, Config, Direction, Error, ErrorCode, I2cPlatform, Lifecycle, NativeGpio,
    PeripheralClass, Pin, PinAddress, ProtocolError, Transition, Transport, TransportError,
};

/// LTC2309 readings above this are a digital high (half of the 12-bit range).
pub const LTC2309_DIGITAL_THRESHOLD: u16 = 2047;
/// ADS1015 readings above this are a digital high.
pub const ADS1015_DIGITAL_THRESHOLD: i16 = 1023;

/// Pin operations, each with its own eligible device classes and error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    PinMode,
    DigitalWrite,
    DigitalRead,
    AnalogWrite,
    SetFrequency,
    AnalogRead,
    DigitalWriteAll,
    DigitalReadAll,
    AnalogWriteAll,
}

impl Op {
    /// Classes that can serve this operation, in lookup order.
    fn classes(self) -> &'static [PeripheralClass] {
        use PeripheralClass::*;
        match self {
            Op::PinMode => &[Digital8, Digital16],
            Op::DigitalWrite => &[Pwm, Digital8, Digital16],
            Op::DigitalRead => &[Digital8, Digital16, AdcMultiplexed, AdcSingleEnded],
            Op::AnalogWrite | Op::SetFrequency => &[Pwm],
            Op::AnalogRead => &[AdcSingleEnded, AdcMultiplexed],
            Op::DigitalWriteAll => &[Digital8, Digital16, Pwm],
            Op::DigitalReadAll => &[Digital8, Digital16],
            Op::AnalogWriteAll => &[Pwm],
        }
    }

    fn native_code(self) -> ErrorCode {
        match self {
            Op::PinMode => ErrorCode::NormalGpioSetPinModeFail,
            Op::DigitalWrite => ErrorCode::NormalGpioWriteFail,
            Op::DigitalRead => ErrorCode::NormalGpioReadFail,
            Op::AnalogWrite => ErrorCode::NormalGpioPwmWriteFail,
            Op::SetFrequency => ErrorCode::NormalGpioPwmChangeFreqFail,
            Op::AnalogRead => ErrorCode::NormalGpioAnalogReadFail,
            Op::DigitalWriteAll | Op::DigitalReadAll | Op::AnalogWriteAll => {
                ErrorCode::UnsupportedOperation
            }
        }
    }

    fn device_code(self, class: PeripheralClass) -> ErrorCode {
        use PeripheralClass::*;
        match (self, class) {
            (Op::PinMode, Digital8) => ErrorCode::Mcp23008SetPinModeFail,
            (Op::PinMode, Digital16) => ErrorCode::Mcp23017SetPinModeFail,
            (Op::DigitalWrite, Pwm) => ErrorCode::Pca9685WriteFail,
            (Op::DigitalWrite, Digital8) => ErrorCode::Mcp23008WriteFail,
            (Op::DigitalWrite, Digital16) => ErrorCode::Mcp23017WriteFail,
            (Op::DigitalRead, Digital8) => ErrorCode::Mcp23008ReadFail,
            (Op::DigitalRead, Digital16) => ErrorCode::Mcp23017ReadFail,
            (Op::DigitalRead | Op::AnalogRead, AdcSingleEnded) => ErrorCode::Ads1015ReadFail,
            (Op::DigitalRead | Op::AnalogRead, AdcMultiplexed) => ErrorCode::Ltc2309ReadFail,
            (Op::AnalogWrite, Pwm) => ErrorCode::Pca9685PwmWriteFail,
            (Op::SetFrequency, Pwm) => ErrorCode::Pca9685PwmChangeFreqFail,
            (Op::DigitalWriteAll, Pwm) => ErrorCode::Pca9685WriteAllFail,
            (Op::DigitalWriteAll, Digital8) => ErrorCode::Mcp23008WriteAllFail,
            (Op::DigitalWriteAll, Digital16) => ErrorCode::Mcp23017WriteAllFail,
            (Op::DigitalReadAll, Digital8) => ErrorCode::Mcp23008ReadAllFail,
            (Op::DigitalReadAll, Digital16) => ErrorCode::Mcp23017ReadAllFail,
            (Op::AnalogWriteAll, Pwm) => ErrorCode::Pca9685PwmWriteAllFail,
            _ => ErrorCode::UnsupportedOperation,
        }
    }
}

fn init_code(class: PeripheralClass) -> ErrorCode {
    match class {
        PeripheralClass::Pwm => ErrorCode::Pca9685InitFail,
        PeripheralClass::Digital8 => ErrorCode::Mcp23008InitFail,
        PeripheralClass::Digital16 => ErrorCode::Mcp23017InitFail,
        PeripheralClass::AdcSingleEnded => ErrorCode::Ads1015InitFail,
        PeripheralClass::AdcMultiplexed => ErrorCode::Ltc2309InitFail,
    }
}

fn deinit_code(class: PeripheralClass) -> ErrorCode {
    match class {
        PeripheralClass::Pwm => ErrorCode::Pca9685DeinitFail,
        PeripheralClass::Digital8 => ErrorCode::Mcp23008DeinitFail,
        PeripheralClass::Digital16 => ErrorCode::Mcp23017DeinitFail,
        PeripheralClass::AdcSingleEnded => ErrorCode::Ads1015DeinitFail,
        PeripheralClass::AdcMultiplexed => ErrorCode::Ltc2309DeinitFail,
    }
}

fn unsupported(addr: u8) -> Error {
    Error::new(
        ErrorCode::UnsupportedOperation,
        Cause::UnsupportedOperation(addr),
    )
}

/// Any of the supported chips, for the bulk lifecycle passes.
enum Chip<T> {
    Pwm(Pca9685<T>),
    Digital8(Mcp23008<T>),
    Digital16(Mcp23017<T>),
    AdcSingleEnded(Ads1015<T>),
    AdcMultiplexed(Ltc2309<T>),
}

impl<T: Transport> Chip<T> {
    fn new(class: PeripheralClass, bus: T, addr: u8) -> Self {
        match class {
            PeripheralClass::Pwm => Chip::Pwm(Pca9685::new(bus, addr)),
            PeripheralClass::Digital8 => Chip::Digital8(Mcp23008::new(bus, addr)),
            PeripheralClass::Digital16 => Chip::Digital16(Mcp23017::new(bus, addr)),
            PeripheralClass::AdcSingleEnded => Chip::AdcSingleEnded(Ads1015::new(bus, addr)),
            PeripheralClass::AdcMultiplexed => Chip::AdcMultiplexed(Ltc2309::new(bus, addr)),
        }
    }
}

impl<T: Transport> Lifecycle for Chip<T> {
    fn init(&mut self, delay: &mut impl DelayNs) -> Result<Transition, ProtocolError> {
        match self {
            Chip::Pwm(chip) => chip.init(delay),
            Chip::Digital8(chip) => chip.init(delay),
            Chip::Digital16(chip) => chip.init(delay),
            Chip::AdcSingleEnded(chip) => chip.init(delay),
            Chip::AdcMultiplexed(chip) => chip.init(delay),
        }
    }

    fn deinit(&mut self) -> Result<Transition, ProtocolError> {
        match self {
            Chip::Pwm(chip) => chip.deinit(),
            Chip::Digital8(chip) => chip.deinit(),
            Chip::Digital16(chip) => chip.deinit(),
            Chip::AdcSingleEnded(chip) => chip.deinit(),
            Chip::AdcMultiplexed(chip) => chip.deinit(),
        }
    }
}

/// The open bus, or why there is none.
fn device_bus<'a, I2C>(
    config: &Config,
    bus: &'a mut Option<Bus<I2C>>,
    code: ErrorCode,
) -> Result<&'a mut Bus<I2C>, Error> {
    if config.bus().is_none() {
        return Err(Error::new(ErrorCode::I2cNotConfigured, Cause::BusNotConfigured));
    }
    bus.as_mut()
        .ok_or_else(|| Error::protocol(code, TransportError::InvalidHandle.into()))
}

/// Unified access to native pins and pins of I2C peripherals.
///
/// Pins are addressed with [`Pin`] identifiers (plain `u32` values work as well).  Every
/// operation decodes the pin, looks the device address up in the [`Config`] and talks to
/// the matching chip.  Addresses that are not registered at all are silently ignored,
/// reads from them return zero.
///
/// The bus is opened by [`init_all`](Self::init_all) and closed by
/// [`deinit_all`](Self::deinit_all).
pub struct ExpandedGpio<P: I2cPlatform, N, D> {
    config: Config,
    platform: P,
    bus: Option<Bus<P::Bus>>,
    native: N,
    delay: D,
    initialized: bool,
}

impl<P, N, D> ExpandedGpio<P, N, D>
where
    P: I2cPlatform,
    N: NativeGpio,
    D: DelayNs,
{
    pub fn new(config: Config, platform: P, native: N, delay: D) -> Self {
        Self {
            config,
            platform,
            bus: None,
            native,
            delay,
            initialized: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn native(&mut self) -> &mut N {
        &mut self.native
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Take the context apart.  An open bus is dropped without going through the platform.
    pub fn release(self) -> (Config, P, N, D) {
        (self.config, self.platform, self.native, self.delay)
    }

    fn classify(&self, op: Op, addr: u8) -> Result<Option<PeripheralClass>, Error> {
        if self.config.bus().is_none() {
            return Err(Error::new(ErrorCode::I2cNotConfigured, Cause::BusNotConfigured));
        }
        if let Some(class) = self.config.find(addr, op.classes()) {
            return Ok(Some(class));
        }
        if self.config.class_of(addr).is_some() {
            return Err(unsupported(addr));
        }
        Ok(None)
    }

    fn route(&self, op: Op, pin: Pin) -> Result<Option<PinAddress>, Error> {
        if pin.is_native() {
            return Ok(Some(PinAddress::Native(pin.0)));
        }
        let address = pin.device_address();
        Ok(self
            .classify(op, address)?
            .map(|class| PinAddress::Device {
                class,
                address,
                index: pin.index(),
            }))
    }

    /// Set the direction of a digital pin.
    pub fn pin_mode(&mut self, pin: impl Into<Pin>, dir: Direction) -> Result<(), Error> {
        let op = Op::PinMode;
        let (class, address, index) = match self.route(op, pin.into())? {
            None => return Ok(()),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .set_pin_mode(raw, dir)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device {
                class,
                address,
                index,
            }) => (class, address, index),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Digital8 => Mcp23008::new(bus, address).set_pin_mode(index, dir),
            PeripheralClass::Digital16 => Mcp23017::new(bus, address).set_pin_mode(index, dir),
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Drive a pin high or low.  PWM channels are switched fully on or off.
    pub fn digital_write(&mut self, pin: impl Into<Pin>, level: bool) -> Result<(), Error> {
        let op = Op::DigitalWrite;
        let (class, address, index) = match self.route(op, pin.into())? {
            None => return Ok(()),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .write(raw, level)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device {
                class,
                address,
                index,
            }) => (class, address, index),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Pwm => Pca9685::new(bus, address).write(index, level),
            PeripheralClass::Digital8 => Mcp23008::new(bus, address).write(index, level),
            PeripheralClass::Digital16 => Mcp23017::new(bus, address).write(index, level),
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Read the level of a pin.
    ///
    /// ADC inputs read as high above [`LTC2309_DIGITAL_THRESHOLD`] or
    /// [`ADS1015_DIGITAL_THRESHOLD`].
    pub fn digital_read(&mut self, pin: impl Into<Pin>) -> Result<bool, Error> {
        let op = Op::DigitalRead;
        let (class, address, index) = match self.route(op, pin.into())? {
            None => return Ok(false),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .read(raw)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device {
                class,
                address,
                index,
            }) => (class, address, index),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Digital8 => Mcp23008::new(bus, address).read(index),
            PeripheralClass::Digital16 => Mcp23017::new(bus, address).read(index),
            PeripheralClass::AdcMultiplexed => Ltc2309::new(bus, address)
                .read(index, &mut self.delay)
                .map(|v| v > LTC2309_DIGITAL_THRESHOLD),
            PeripheralClass::AdcSingleEnded => Ads1015::new(bus, address)
                .read(index, &mut self.delay)
                .map(|v| v > ADS1015_DIGITAL_THRESHOLD),
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Set the duty cycle of a PWM output, 0 to 4095 on PCA9685 channels.
    pub fn analog_write(&mut self, pin: impl Into<Pin>, value: u16) -> Result<(), Error> {
        let op = Op::AnalogWrite;
        let (class, address, index) = match self.route(op, pin.into())? {
            None => return Ok(()),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .pwm_write(raw, value)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device {
                class,
                address,
                index,
            }) => (class, address, index),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Pwm => Pca9685::new(bus, address).pwm_write(index, value),
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Change the PWM frequency of a pin.  On a PCA9685 this affects all 16 channels.
    pub fn analog_write_set_frequency(
        &mut self,
        pin: impl Into<Pin>,
        hz: u32,
    ) -> Result<(), Error> {
        let op = Op::SetFrequency;
        let (class, address) = match self.route(op, pin.into())? {
            None => return Ok(()),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .pwm_frequency(raw, hz)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device { class, address, .. }) => (class, address),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Pwm => Pca9685::new(bus, address).set_frequency(hz),
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Read the raw 12-bit value of an analog input.
    pub fn analog_read(&mut self, pin: impl Into<Pin>) -> Result<u16, Error> {
        let op = Op::AnalogRead;
        let (class, address, index) = match self.route(op, pin.into())? {
            None => return Ok(0),
            Some(PinAddress::Native(raw)) => {
                return self
                    .native
                    .analog_read(raw)
                    .map_err(|e| Error::native(op.native_code(), e))
            }
            Some(PinAddress::Device {
                class,
                address,
                index,
            }) => (class, address, index),
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::AdcSingleEnded => {
                Ads1015::new(bus, address).read_unsigned(index, &mut self.delay)
            }
            PeripheralClass::AdcMultiplexed => {
                Ltc2309::new(bus, address).read(index, &mut self.delay)
            }
            _ => return Err(unsupported(address)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    fn bulk_target(&self, op: Op, addr: u8) -> Result<Option<PeripheralClass>, Error> {
        if addr == 0 {
            return Ok(None);
        }
        self.classify(op, addr)
    }

    /// Drive every output of the device at `addr`, bit *k* of `levels` is pin *k*.
    pub fn digital_write_all(&mut self, addr: u8, levels: u16) -> Result<(), Error> {
        let op = Op::DigitalWriteAll;
        let Some(class) = self.bulk_target(op, addr)? else {
            return Ok(());
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Digital8 => Mcp23008::new(bus, addr).write_all(levels),
            PeripheralClass::Digital16 => Mcp23017::new(bus, addr).write_all(levels),
            PeripheralClass::Pwm => Pca9685::new(bus, addr).write_all(levels),
            _ => return Err(unsupported(addr)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Read every pin of the expander at `addr`, bit *k* is pin *k*.
    pub fn digital_read_all(&mut self, addr: u8) -> Result<u16, Error> {
        let op = Op::DigitalReadAll;
        let Some(class) = self.bulk_target(op, addr)? else {
            return Ok(0);
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Digital8 => Mcp23008::new(bus, addr).read_all(),
            PeripheralClass::Digital16 => Mcp23017::new(bus, addr).read_all(),
            _ => return Err(unsupported(addr)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    /// Set the duty cycle of all 16 channels of the PWM driver at `addr`.
    pub fn analog_write_all(
        &mut self,
        addr: u8,
        values: &[u16; crate::dev::pca9685::CHANNELS],
    ) -> Result<(), Error> {
        let op = Op::AnalogWriteAll;
        let Some(class) = self.bulk_target(op, addr)? else {
            return Ok(());
        };
        let code = op.device_code(class);
        let bus = device_bus(&self.config, &mut self.bus, code)?;
        let result = match class {
            PeripheralClass::Pwm => Pca9685::new(bus, addr).pwm_write_all(values),
            _ => return Err(unsupported(addr)),
        };
        result.map_err(|e| Error::protocol(code, e))
    }

    fn init_class(&mut self, class: PeripheralClass, restart: bool) -> Result<(), Error> {
        let code = init_code(class);
        for &addr in self.config.devices(class) {
            let bus = device_bus(&self.config, &mut self.bus, code)?;
            let mut chip = Chip::new(class, bus, addr);
            let result = match chip.init(&mut self.delay) {
                Ok(Transition::AlreadyInState) if restart => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("{} at {=u8:#x} already initialized, restarting", class, addr);
                    chip.deinit().and_then(|_| chip.init(&mut self.delay))
                }
                result => result,
            };
            match result {
                #[cfg(feature = "defmt")]
                Ok(Transition::AlreadyInState) => {
                    defmt::debug!("{} at {=u8:#x} already initialized", class, addr);
                }
                Ok(_) => {}
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{} at {=u8:#x} failed to initialize: {}", class, addr, e);
                    return Err(Error::protocol(code, e));
                }
            }
        }
        Ok(())
    }

    fn deinit_class(&mut self, class: PeripheralClass) -> Result<(), Error> {
        let code = deinit_code(class);
        for &addr in self.config.devices(class) {
            let bus = device_bus(&self.config, &mut self.bus, code)?;
            match Chip::new(class, bus, addr).deinit() {
                #[cfg(feature = "defmt")]
                Ok(Transition::AlreadyInState) => {
                    defmt::debug!("{} at {=u8:#x} already deinitialized", class, addr);
                }
                Ok(_) => {}
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{} at {=u8:#x} failed to deinitialize: {}", class, addr, e);
                    return Err(Error::protocol(code, e));
                }
            }
        }
        Ok(())
    }

    fn init_devices(&mut self, restart: bool) -> Result<(), Error> {
        for class in PeripheralClass::ALL {
            if class == PeripheralClass::AdcSingleEnded && self.config.bus().is_some() {
                // settle time before the first ADC conversion
                self.delay.delay_ms(self.config.settle_delay_ms());
            }
            self.init_class(class, restart)?;
        }
        Ok(())
    }

    /// Close the bus opened by a bring-up that did not complete.
    fn close_after_failure(&mut self) {
        if let Some(bus) = self.bus.take() {
            if let Err(_e) = bus.close(&mut self.platform) {
                #[cfg(feature = "defmt")]
                defmt::warn!("closing the bus after a failed bring-up: {}", _e);
            }
        }
    }

    /// Open the bus and bring up the native backend and every configured device.
    ///
    /// Devices are initialized in the order PWM drivers, 8-bit expanders, 16-bit
    /// expanders, then after the settle delay the single-ended and multiplexed ADCs.
    /// Devices that are already configured are left alone, unless `restart` is set in
    /// which case they are reset and configured again.
    ///
    /// The first failure aborts the pass.  A native backend that was already brought up
    /// is deinitialized again and the bus is closed, so the call can be retried.  Devices
    /// keep whatever state the failed pass left them in.  The returned error is always
    /// the one that aborted the pass; failures of the native deinit or the bus close
    /// during that cleanup are discarded (and logged with the `defmt` feature).
    pub fn init_all(&mut self, restart: bool) -> Result<(), Error> {
        if self.initialized {
            return Err(Error::new(
                ErrorCode::I2cAlreadyInitialized,
                Cause::AlreadyInitialized,
            ));
        }

        if let Some(bus_id) = self.config.bus() {
            let bus = Bus::open(&mut self.platform, bus_id)
                .map_err(|e| Error::protocol(ErrorCode::I2cInitFail, e.into()))?;
            self.bus = Some(bus);
        }

        if let Err(e) = self.native.init() {
            self.close_after_failure();
            return Err(Error::native(ErrorCode::NormalGpioInitFail, e));
        }

        if let Err(e) = self.init_devices(restart) {
            if let Err(_native) = self.native.deinit() {
                #[cfg(feature = "defmt")]
                defmt::warn!("deinitializing native pins after a failed bring-up: {}", _native);
            }
            self.close_after_failure();
            return Err(e);
        }

        self.initialized = true;
        Ok(())
    }

    /// Return every device to its defaults in reverse bring-up order, deinitialize the
    /// native backend and close the bus.
    pub fn deinit_all(&mut self) -> Result<(), Error> {
        if !self.initialized {
            return Err(Error::new(
                ErrorCode::I2cAlreadyDeinitialized,
                Cause::AlreadyDeinitialized,
            ));
        }

        for class in PeripheralClass::ALL.into_iter().rev() {
            self.deinit_class(class)?;
        }

        self.native
            .deinit()
            .map_err(|e| Error::native(ErrorCode::NormalGpioDeinitFail, e))?;

        if let Some(bus) = self.bus.take() {
            bus.close(&mut self.platform)
                .map_err(|e| Error::protocol(ErrorCode::I2cDeinitFail, e.into()))?;
        }

        self.initialized = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NativeError;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Init,
        Deinit,
        SetPinMode(u32, Direction),
        Write(u32, bool),
        Read(u32),
        PwmWrite(u32, u16),
        PwmFrequency(u32, u32),
        AnalogRead(u32),
    }

    #[derive(Default)]
    struct FakeNative {
        calls: Vec<Call>,
        fail: Option<i32>,
    }

    impl FakeNative {
        fn record(&mut self, call: Call) -> Result<(), NativeError> {
            self.calls.push(call);
            match self.fail {
                Some(code) => Err(NativeError(code)),
                None => Ok(()),
            }
        }
    }

    impl NativeGpio for FakeNative {
        fn init(&mut self) -> Result<(), NativeError> {
            self.record(Call::Init)
        }
        fn deinit(&mut self) -> Result<(), NativeError> {
            self.record(Call::Deinit)
        }
        fn set_pin_mode(&mut self, pin: u32, dir: Direction) -> Result<(), NativeError> {
            self.record(Call::SetPinMode(pin, dir))
        }
        fn write(&mut self, pin: u32, value: bool) -> Result<(), NativeError> {
            self.record(Call::Write(pin, value))
        }
        fn read(&mut self, pin: u32) -> Result<bool, NativeError> {
            self.record(Call::Read(pin)).map(|_| true)
        }
        fn pwm_write(&mut self, pin: u32, value: u16) -> Result<(), NativeError> {
            self.record(Call::PwmWrite(pin, value))
        }
        fn pwm_frequency(&mut self, pin: u32, hz: u32) -> Result<(), NativeError> {
            self.record(Call::PwmFrequency(pin, hz))
        }
        fn analog_read(&mut self, pin: u32) -> Result<u16, NativeError> {
            self.record(Call::AnalogRead(pin)).map(|_| 512)
        }
    }

    fn gpio(
        config: Config,
        mock: &mock_i2c::Mock,
    ) -> ExpandedGpio<impl I2cPlatform<Bus = mock_i2c::Mock>, FakeNative, NoopDelay> {
        let mock = mock.clone();
        let platform = move |_bus: u8| -> Result<mock_i2c::Mock, TransportError> {
            Ok(mock.clone())
        };
        ExpandedGpio::new(config, platform, FakeNative::default(), NoopDelay::new())
    }

    fn mcp23017_signature(addr: u8, iocon: u8) -> Vec<mock_i2c::Transaction> {
        vec![
            mock_i2c::Transaction::write_read(addr, vec![0x0a], vec![iocon]),
            mock_i2c::Transaction::write_read(addr, vec![0x0b], vec![iocon]),
            mock_i2c::Transaction::write_read(addr, vec![0x0c], vec![0x00]),
            mock_i2c::Transaction::write_read(addr, vec![0x0d], vec![0x00]),
        ]
    }

    fn mcp23008_reset(addr: u8) -> Vec<mock_i2c::Transaction> {
        (0x00..=0x0au8)
            .map(|reg| {
                let value = if reg == 0x00 { 0xff } else { 0x00 };
                mock_i2c::Transaction::write(addr, vec![reg, value])
            })
            .collect()
    }

    fn pca9685_reset(addr: u8) -> Vec<mock_i2c::Transaction> {
        let mut regs = vec![0x00, 0x31, 0x04, 0xe2, 0xe4, 0xe8, 0xe0];
        for _ in 0..16 {
            regs.extend([0x00, 0x00, 0x00, 0x10]);
        }
        vec![
            mock_i2c::Transaction::write(addr, regs),
            mock_i2c::Transaction::write(addr, vec![0xfa, 0x00, 0x20, 0x00, 0x20, 0x1e]),
            mock_i2c::Transaction::write(addr, vec![0x00, 0x11]),
        ]
    }

    #[test]
    fn mcp23017_end_to_end() {
        let mut expectations = mcp23017_signature(0x20, 0x24);
        expectations.extend([
            // pin_mode(0x200a, Output)
            mock_i2c::Transaction::write_read(0x20, vec![0x01], vec![0xff]),
            mock_i2c::Transaction::write(0x20, vec![0x01, 0xfb]),
            // digital_write(0x200a, true)
            mock_i2c::Transaction::write_read(0x20, vec![0x13], vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x13, 0x04]),
            // digital_read(0x200a)
            mock_i2c::Transaction::write_read(0x20, vec![0x13], vec![0x04]),
            // digital_read_all(0x20)
            mock_i2c::Transaction::write_read(0x20, vec![0x12], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x13], vec![0x04]),
        ]);
        expectations.extend(mcp23017_signature(0x20, 0x24));
        for reg in 0x00..=0x15u8 {
            let value = if reg <= 0x01 { 0xff } else { 0x00 };
            expectations.push(mock_i2c::Transaction::write(0x20, vec![reg, value]));
        }
        let mut mock = mock_i2c::Mock::new(&expectations);

        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital16, 0x20)
            .unwrap();
        let mut gpio = gpio(config, &mock);
        let pin = Pin(0x200a);

        gpio.init_all(false).unwrap();
        gpio.pin_mode(pin, Direction::Output).unwrap();
        gpio.digital_write(pin, true).unwrap();
        assert!(gpio.digital_read(pin).unwrap());
        assert_eq!(gpio.digital_read_all(0x20).unwrap() & (1 << 10), 1 << 10);
        gpio.deinit_all().unwrap();

        assert_eq!(gpio.native().calls, vec![Call::Init, Call::Deinit]);
        mock.done();
    }

    #[test]
    fn native_pins_skip_the_bus() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let mut gpio = gpio(Config::new(Some(1)), &mock);

        gpio.pin_mode(Pin(3), Direction::Input).unwrap();
        gpio.digital_write(Pin(4), true).unwrap();
        assert!(gpio.digital_read(Pin(5)).unwrap());
        gpio.analog_write(Pin(6), 100).unwrap();
        gpio.analog_write_set_frequency(Pin(6), 1000).unwrap();
        assert_eq!(gpio.analog_read(0x0001_0007u32).unwrap(), 512);

        assert_eq!(
            gpio.native().calls,
            vec![
                Call::SetPinMode(3, Direction::Input),
                Call::Write(4, true),
                Call::Read(5),
                Call::PwmWrite(6, 100),
                Call::PwmFrequency(6, 1000),
                Call::AnalogRead(0x0001_0007),
            ]
        );
        mock.done();
    }

    #[test]
    fn native_failure_keeps_backend_code() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let mut gpio = gpio(Config::new(None), &mock);
        gpio.native().fail = Some(-5);

        let e = gpio.digital_write(Pin(2), true).unwrap_err();
        assert_eq!(e.code(), ErrorCode::NormalGpioWriteFail);
        assert_eq!(e.cause(), Cause::Native(NativeError(-5)));

        let e = gpio.init_all(false).unwrap_err();
        assert_eq!(e.code(), ErrorCode::NormalGpioInitFail);
        assert!(!gpio.is_initialized());

        mock.done();
    }

    #[test]
    fn unknown_devices_are_ignored() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x20)
            .unwrap();
        let mut gpio = gpio(config, &mock);
        let pin = Pin::new(0x33, 1);

        gpio.digital_write(pin, true).unwrap();
        assert!(!gpio.digital_read(pin).unwrap());
        assert_eq!(gpio.analog_read(pin).unwrap(), 0);
        gpio.analog_write(pin, 10).unwrap();
        gpio.pin_mode(pin, Direction::Output).unwrap();
        assert_eq!(gpio.digital_read_all(0x33).unwrap(), 0);
        gpio.digital_write_all(0x33, 0xffff).unwrap();
        gpio.analog_write_all(0x33, &[0; 16]).unwrap();
        assert_eq!(gpio.digital_read_all(0x00).unwrap(), 0);

        mock.done();
    }

    #[test]
    fn ineligible_class_is_unsupported() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x20)
            .and_then(|c| c.with_device(PeripheralClass::AdcMultiplexed, 0x08))
            .unwrap();
        let mut gpio = gpio(config, &mock);

        let e = gpio.analog_write(Pin::new(0x20, 1), 100).unwrap_err();
        assert_eq!(e.code(), ErrorCode::UnsupportedOperation);
        assert_eq!(e.cause(), Cause::UnsupportedOperation(0x20));

        let e = gpio.pin_mode(Pin::new(0x08, 1), Direction::Output).unwrap_err();
        assert_eq!(e.cause(), Cause::UnsupportedOperation(0x08));
        let e = gpio.analog_write_all(0x20, &[0; 16]).unwrap_err();
        assert_eq!(e.code(), ErrorCode::UnsupportedOperation);

        mock.done();
    }

    #[test]
    fn missing_bus() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let mut gpio = gpio(Config::new(None), &mock);

        gpio.init_all(false).unwrap();
        let e = gpio.digital_write(Pin::new(0x20, 1), true).unwrap_err();
        assert_eq!(e.code(), ErrorCode::I2cNotConfigured);
        assert_eq!(e.cause(), Cause::BusNotConfigured);
        let e = gpio.digital_read_all(0x20).unwrap_err();
        assert_eq!(e.cause(), Cause::BusNotConfigured);
        gpio.deinit_all().unwrap();

        mock.done();
    }

    #[test]
    fn bus_must_be_open() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x20)
            .unwrap();
        let mut gpio = gpio(config, &mock);

        let e = gpio.digital_write(Pin::new(0x20, 1), true).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Mcp23008WriteFail);
        assert_eq!(e.transport(), Some(TransportError::InvalidHandle));

        mock.done();
    }

    #[test]
    fn lifecycle_guards() {
        let mut mock = mock_i2c::Mock::new(&[]);
        let mut gpio = gpio(Config::new(Some(1)), &mock);

        let e = gpio.deinit_all().unwrap_err();
        assert_eq!(e.code(), ErrorCode::I2cAlreadyDeinitialized);
        gpio.init_all(false).unwrap();
        let e = gpio.init_all(false).unwrap_err();
        assert_eq!(e.code(), ErrorCode::I2cAlreadyInitialized);
        assert_eq!(e.code().code(), 1);
        gpio.deinit_all().unwrap();
        assert!(!gpio.is_initialized());

        mock.done();
    }

    #[test]
    fn bus_open_failure() {
        let config = Config::new(Some(3));
        let platform = |bus_id: u8| -> Result<mock_i2c::Mock, TransportError> {
            Err(TransportError::NoSuchBus(bus_id))
        };
        let mut gpio =
            ExpandedGpio::new(config, platform, FakeNative::default(), NoopDelay::new());

        let e = gpio.init_all(false).unwrap_err();
        assert_eq!(e.code(), ErrorCode::I2cInitFail);
        assert_eq!(e.transport(), Some(TransportError::NoSuchBus(3)));
        assert!(gpio.native().calls.is_empty());
    }

    #[test]
    fn bring_up_order_and_restart() {
        // PCA9685 already configured: deinit resets it, init configures it again
        let mut expectations = vec![
            mock_i2c::Transaction::write_read(0x40, vec![0x00], vec![0x20]),
            mock_i2c::Transaction::write_read(0x40, vec![0x01], vec![0x04]),
            mock_i2c::Transaction::write_read(0x40, vec![0x00], vec![0x20]),
            mock_i2c::Transaction::write_read(0x40, vec![0x01], vec![0x04]),
            mock_i2c::Transaction::write_read(0x40, vec![0xfe], vec![0x0b]),
        ];
        expectations.extend(pca9685_reset(0x40));
        expectations.extend([
            mock_i2c::Transaction::write_read(0x40, vec![0x00], vec![0x11]),
            mock_i2c::Transaction::write_read(0x40, vec![0x01], vec![0x04]),
        ]);
        expectations.extend(pca9685_reset(0x40));
        expectations.extend([
            mock_i2c::Transaction::write(0x40, vec![0x00, 0x30]),
            mock_i2c::Transaction::write(0x40, vec![0x01, 0x04]),
            mock_i2c::Transaction::write(0x40, vec![0xfe, 0x0b]),
            mock_i2c::Transaction::write(0x40, vec![0x00, 0x20]),
            // MCP23008 already configured, same treatment
            mock_i2c::Transaction::write_read(0x21, vec![0x05], vec![0x24]),
            mock_i2c::Transaction::write_read(0x21, vec![0x06], vec![0x00]),
            mock_i2c::Transaction::write_read(0x21, vec![0x05], vec![0x24]),
            mock_i2c::Transaction::write_read(0x21, vec![0x06], vec![0x00]),
        ]);
        expectations.extend(mcp23008_reset(0x21));
        expectations.extend([
            mock_i2c::Transaction::write_read(0x21, vec![0x05], vec![0x00]),
            mock_i2c::Transaction::write_read(0x21, vec![0x06], vec![0x00]),
        ]);
        expectations.extend(mcp23008_reset(0x21));
        expectations.extend([
            mock_i2c::Transaction::write(0x21, vec![0x05, 0x24]),
            // ADS1015 then LTC2309 test conversions
            mock_i2c::Transaction::write(0x48, vec![0x01, 0xc3, 0x83]),
            mock_i2c::Transaction::write_read(0x48, vec![0x00], vec![0x00, 0x00]),
            mock_i2c::Transaction::write(0x08, vec![0x88]),
            mock_i2c::Transaction::read(0x08, vec![0x00, 0x00]),
        ]);
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::AdcMultiplexed, 0x08)
            .and_then(|c| c.with_device(PeripheralClass::AdcSingleEnded, 0x48))
            .and_then(|c| c.with_device(PeripheralClass::Digital8, 0x21))
            .and_then(|c| c.with_device(PeripheralClass::Pwm, 0x40))
            .unwrap();
        let mut gpio = gpio(config, &mock);

        gpio.init_all(true).unwrap();
        assert!(gpio.is_initialized());

        mock.done();
    }

    #[test]
    fn first_failing_device_aborts() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x05], vec![0x00])
                .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            // second attempt
            mock_i2c::Transaction::write_read(0x20, vec![0x05], vec![0x24]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0x00]),
            mock_i2c::Transaction::write(0x08, vec![0x88]),
            mock_i2c::Transaction::read(0x08, vec![0x12, 0x30]),
        ];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x20)
            .and_then(|c| c.with_device(PeripheralClass::AdcMultiplexed, 0x08))
            .unwrap();
        let mut gpio = gpio(config, &mock);

        let e = gpio.init_all(false).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Mcp23008InitFail);
        assert_eq!(e.transport(), Some(TransportError::SlaveNack(0x20)));
        assert!(!gpio.is_initialized());

        gpio.init_all(false).unwrap();
        assert!(gpio.is_initialized());
        assert_eq!(
            gpio.native().calls,
            vec![Call::Init, Call::Deinit, Call::Init]
        );

        mock.done();
    }

    struct CloseFails {
        mock: mock_i2c::Mock,
        closes: u32,
    }

    impl I2cPlatform for CloseFails {
        type Bus = mock_i2c::Mock;

        fn open(&mut self, _bus_id: u8) -> Result<mock_i2c::Mock, TransportError> {
            Ok(self.mock.clone())
        }

        fn close(&mut self, _bus: mock_i2c::Mock) -> Result<(), TransportError> {
            self.closes += 1;
            Err(TransportError::PlatformFault(-9))
        }
    }

    #[test]
    fn failed_bring_up_unwinds_native_and_bus() {
        let expectations = [mock_i2c::Transaction::write(0x08, vec![0x88])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::AdcMultiplexed, 0x08)
            .unwrap();
        let platform = CloseFails {
            mock: mock.clone(),
            closes: 0,
        };
        let mut gpio =
            ExpandedGpio::new(config, platform, FakeNative::default(), NoopDelay::new());

        // the device error wins over the failing close
        let e = gpio.init_all(false).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Ltc2309InitFail);
        assert_eq!(e.transport(), Some(TransportError::SlaveNack(0x08)));
        assert!(!gpio.is_initialized());
        assert!(gpio.bus.is_none());

        let (_, platform, native, _) = gpio.release();
        assert_eq!(platform.closes, 1);
        assert_eq!(native.calls, vec![Call::Init, Call::Deinit]);

        mock.done();
    }

    #[test]
    fn mcp23008_pins() {
        let expectations = [
            // pin_mode(0x2103, Output)
            mock_i2c::Transaction::write_read(0x21, vec![0x00], vec![0xff]),
            mock_i2c::Transaction::write(0x21, vec![0x00, 0xf7]),
            // digital_write(0x2103, true)
            mock_i2c::Transaction::write_read(0x21, vec![0x09], vec![0x00]),
            mock_i2c::Transaction::write(0x21, vec![0x09, 0x08]),
            // digital_read(0x2103)
            mock_i2c::Transaction::write_read(0x21, vec![0x09], vec![0x08]),
            // digital_read_all(0x21)
            mock_i2c::Transaction::write_read(0x21, vec![0x09], vec![0x08]),
        ];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x21)
            .unwrap();
        let mut gpio = gpio(config, &mock);
        gpio.bus = Some(Bus::new(mock.clone(), 1));
        let pin = Pin::new(0x21, 3);

        gpio.pin_mode(pin, Direction::Output).unwrap();
        gpio.digital_write(pin, true).unwrap();
        assert!(gpio.digital_read(pin).unwrap());
        assert_eq!(gpio.digital_read_all(0x21).unwrap(), 0x0008);

        let e = gpio.digital_write(Pin::new(0x21, 8), true).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Mcp23008WriteFail);
        assert_eq!(e.cause(), Cause::Protocol(ProtocolError::InvalidIndex(8)));

        mock.done();
    }

    #[test]
    fn bulk_writes_reach_each_class() {
        let mut on_frame = vec![0x06, 0x00, 0x10, 0x00, 0x00];
        for _ in 1..16 {
            on_frame.extend([0x00, 0x00, 0x00, 0x10]);
        }
        let mut pwm_frame = vec![0x06];
        for channel in 0..16u8 {
            pwm_frame.extend([0x00, 0x00, 0x00, channel]);
        }
        let expectations = [
            mock_i2c::Transaction::write(0x21, vec![0x09, 0xa5]),
            mock_i2c::Transaction::write(0x20, vec![0x12, 0x01]),
            mock_i2c::Transaction::write(0x20, vec![0x13, 0x80]),
            mock_i2c::Transaction::write(0x40, on_frame),
            mock_i2c::Transaction::write(0x40, pwm_frame),
        ];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Digital8, 0x21)
            .and_then(|c| c.with_device(PeripheralClass::Digital16, 0x20))
            .and_then(|c| c.with_device(PeripheralClass::Pwm, 0x40))
            .unwrap();
        let mut gpio = gpio(config, &mock);
        gpio.bus = Some(Bus::new(mock.clone(), 1));

        gpio.digital_write_all(0x21, 0x00a5).unwrap();
        gpio.digital_write_all(0x20, 0x8001).unwrap();
        gpio.digital_write_all(0x40, 0x0001).unwrap();
        let values: [u16; 16] = core::array::from_fn(|channel| channel as u16 * 256);
        gpio.analog_write_all(0x40, &values).unwrap();

        mock.done();
    }

    #[test]
    fn pwm_frequency_through_dispatcher() {
        let sleep_bracket = |prescaler: u8| {
            [
                mock_i2c::Transaction::write_read(0x40, vec![0x00], vec![0x20]),
                mock_i2c::Transaction::write(0x40, vec![0x00, 0x30]),
                mock_i2c::Transaction::write(0x40, vec![0xfe, prescaler]),
                mock_i2c::Transaction::write_read(0x40, vec![0x00], vec![0x30]),
                mock_i2c::Transaction::write(0x40, vec![0x00, 0x20]),
            ]
        };
        let mut expectations = sleep_bracket(0x0b).to_vec();
        expectations.extend(sleep_bracket(0x03));
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Pwm, 0x40)
            .unwrap();
        let mut gpio = gpio(config, &mock);
        gpio.bus = Some(Bus::new(mock.clone(), 1));

        gpio.analog_write_set_frequency(Pin::new(0x40, 5), 500).unwrap();
        gpio.analog_write_set_frequency(Pin::new(0x40, 0), 1526).unwrap();

        let e = gpio.analog_write_set_frequency(Pin::new(0x40, 0), 1527).unwrap_err();
        assert_eq!(
            e.cause(),
            Cause::Protocol(ProtocolError::FrequencyOutOfRange(1527))
        );

        mock.done();
    }

    #[test]
    fn adc_pins_as_digital_inputs() {
        let expectations = [
            mock_i2c::Transaction::write(0x08, vec![0xc8]),
            mock_i2c::Transaction::read(0x08, vec![0x80, 0x00]),
            mock_i2c::Transaction::write(0x08, vec![0xc8]),
            mock_i2c::Transaction::read(0x08, vec![0x7f, 0xf0]),
            mock_i2c::Transaction::write(0x48, vec![0x01, 0xd3, 0x83]),
            mock_i2c::Transaction::write_read(0x48, vec![0x00], vec![0x40, 0x00]),
            mock_i2c::Transaction::write(0x48, vec![0x01, 0xd3, 0x83]),
            mock_i2c::Transaction::write_read(0x48, vec![0x00], vec![0x3f, 0xf0]),
            // analog_read clamps the ADS1015 offset
            mock_i2c::Transaction::write(0x48, vec![0x01, 0xc3, 0x83]),
            mock_i2c::Transaction::write_read(0x48, vec![0x00], vec![0xff, 0xf0]),
            mock_i2c::Transaction::write(0x08, vec![0x88]),
            mock_i2c::Transaction::read(0x08, vec![0xab, 0xc0]),
        ];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::AdcMultiplexed, 0x08)
            .and_then(|c| c.with_device(PeripheralClass::AdcSingleEnded, 0x48))
            .unwrap();
        let mut gpio = gpio(config, &mock);
        gpio.bus = Some(Bus::new(mock.clone(), 1));

        assert!(gpio.digital_read(Pin::new(0x08, 1)).unwrap());
        assert!(!gpio.digital_read(Pin::new(0x08, 1)).unwrap());
        assert!(gpio.digital_read(Pin::new(0x48, 1)).unwrap());
        assert!(!gpio.digital_read(Pin::new(0x48, 1)).unwrap());
        assert_eq!(gpio.analog_read(Pin::new(0x48, 0)).unwrap(), 0);
        assert_eq!(gpio.analog_read(Pin::new(0x08, 0)).unwrap(), 0xabc);

        mock.done();
    }

    #[test]
    fn pwm_pins() {
        let expectations = [
            mock_i2c::Transaction::write(0x40, vec![0x0e, 0x00, 0x10, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x40, vec![0x0e, 0x00, 0x00, 0x00, 0x10]),
            mock_i2c::Transaction::write(0x40, vec![0x0e, 0x00, 0x00, 0xff, 0x0f]),
        ];
        let mut mock = mock_i2c::Mock::new(&expectations);
        let config = Config::new(Some(1))
            .with_device(PeripheralClass::Pwm, 0x40)
            .unwrap();
        let mut gpio = gpio(config, &mock);
        gpio.bus = Some(Bus::new(mock.clone(), 1));
        let pin = Pin::new(0x40, 2);

        gpio.digital_write(pin, true).unwrap();
        gpio.digital_write(pin, false).unwrap();
        gpio.analog_write(pin, 4095).unwrap();

        let e = gpio.analog_write(pin, 4096).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Pca9685PwmWriteFail);
        assert_eq!(
            e.cause(),
            Cause::Protocol(ProtocolError::ValueOutOfRange(4096))
        );

        let e = gpio.analog_write_set_frequency(pin, 23).unwrap_err();
        assert_eq!(e.code(), ErrorCode::Pca9685PwmChangeFreqFail);
        assert_eq!(
            e.cause(),
            Cause::Protocol(ProtocolError::FrequencyOutOfRange(23))
        );

        mock.done();
    }
}
