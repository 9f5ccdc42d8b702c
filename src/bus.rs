use embedded_hal::i2c::{self as hal_i2c, ErrorKind};

use crate::TransportError;

/// Raw addressed transactions on an I2C bus.
///
/// All chip drivers are written against this trait.  [`Bus`] implements it on top of any
/// `embedded-hal` I2C implementation.
pub trait Transport {
    /// Write `bytes` to the device at `addr`.  An empty write succeeds without bus traffic.
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), TransportError>;

    /// Fill `buffer` from the device at `addr`.  An empty read succeeds without bus traffic.
    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), TransportError>;

    /// Write `bytes` and then read into `buffer` in one transaction, without a stop
    /// condition in between.
    fn write_read(
        &mut self,
        addr: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), TransportError> {
        T::write(self, addr, bytes)
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), TransportError> {
        T::read(self, addr, buffer)
    }

    fn write_read(
        &mut self,
        addr: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), TransportError> {
        T::write_read(self, addr, bytes, buffer)
    }
}

/// Source of I2C bus connections.
///
/// Any `FnMut(u8) -> Result<I2C, TransportError>` is a platform, which is handy for tests
/// and for platforms where the bus is created elsewhere.
pub trait I2cPlatform {
    type Bus: hal_i2c::I2c;

    fn open(&mut self, bus_id: u8) -> Result<Self::Bus, TransportError>;

    fn close(&mut self, bus: Self::Bus) -> Result<(), TransportError> {
        drop(bus);
        Ok(())
    }
}

impl<F, I2C> I2cPlatform for F
where
    F: FnMut(u8) -> Result<I2C, TransportError>,
    I2C: hal_i2c::I2c,
{
    type Bus = I2C;

    fn open(&mut self, bus_id: u8) -> Result<Self::Bus, TransportError> {
        self(bus_id)
    }
}

/// An open I2C bus.
///
/// The handle owns the connection; [`Bus::close`] consumes it so a closed bus can not be
/// used or closed again.
pub struct Bus<I2C> {
    i2c: I2C,
    id: u8,
}

impl<I2C: hal_i2c::I2c> Bus<I2C> {
    /// Wrap an already opened connection.
    pub fn new(i2c: I2C, id: u8) -> Self {
        Self { i2c, id }
    }

    /// Open bus `bus_id` through `platform`.
    pub fn open<P>(platform: &mut P, bus_id: u8) -> Result<Self, TransportError>
    where
        P: I2cPlatform<Bus = I2C>,
    {
        let i2c = platform.open(bus_id)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("opened I2C bus {}", bus_id);
        Ok(Self::new(i2c, bus_id))
    }

    pub fn close<P>(self, platform: &mut P) -> Result<(), TransportError>
    where
        P: I2cPlatform<Bus = I2C>,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("closing I2C bus {}", self.id);
        platform.close(self.i2c)
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Give back the underlying connection without going through a platform.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn check_address(addr: u8) -> Result<(), TransportError> {
    if addr >= 128 {
        return Err(TransportError::InvalidAddress(addr));
    }
    Ok(())
}

fn map_error<E: hal_i2c::Error>(addr: u8, e: E) -> TransportError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => TransportError::SlaveNack(addr),
        ErrorKind::ArbitrationLoss | ErrorKind::Overrun => TransportError::Retryable,
        kind => TransportError::UnexpectedTransportResult(kind),
    }
}

impl<I2C: hal_i2c::I2c> Transport for Bus<I2C> {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), TransportError> {
        check_address(addr)?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.i2c.write(addr, bytes).map_err(|e| map_error(addr, e))
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<(), TransportError> {
        check_address(addr)?;
        if buffer.is_empty() {
            return Ok(());
        }
        self.i2c.read(addr, buffer).map_err(|e| map_error(addr, e))
    }

    fn write_read(
        &mut self,
        addr: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), TransportError> {
        check_address(addr)?;
        if bytes.is_empty() || buffer.is_empty() {
            return Err(TransportError::InvalidArgument);
        }
        self.i2c
            .write_read(addr, bytes, buffer)
            .map_err(|e| map_error(addr, e))
    }
}

/// Register access helpers shared by the chip drivers.
pub(crate) trait I2cExt {
    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8)
        -> Result<(), TransportError>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, TransportError>;
    /// Read a register, apply `f` and write the result back only if it changed.
    ///
    /// Returns whether a write happened.
    fn modify_reg<R: Into<u8>, F: FnOnce(u8) -> u8>(
        &mut self,
        addr: u8,
        reg: R,
        f: F,
    ) -> Result<bool, TransportError>;
}

impl<T: Transport> I2cExt for T {
    fn write_reg<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u8,
    ) -> Result<(), TransportError> {
        self.write(addr, &[reg.into(), value])
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, TransportError> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }

    fn modify_reg<R: Into<u8>, F: FnOnce(u8) -> u8>(
        &mut self,
        addr: u8,
        reg: R,
        f: F,
    ) -> Result<bool, TransportError> {
        let reg = reg.into();
        let old = self.read_reg(addr, reg)?;
        let new = f(old);
        if new == old {
            return Ok(false);
        }
        self.write_reg(addr, reg, new)?;
        Ok(true)
    }
}
