//! Register-level driver shared by the MCP230xx family of GPIO expanders.
//!
//! The chips only differ in the number of 8-bit ports and in where the per-port registers
//! live, which is described by a [`PortRegs`] implementation.  Multi-pin values are packed
//! so that bit *k* is pin *k*: port A in the low byte, port B in the high byte.
use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;

use crate::bus::I2cExt;
use crate::{Direction, Lifecycle, ProtocolError, Transition, Transport};

/// IOCON: sequential operation disabled.
pub(crate) const IOCON_SEQOP: u8 = 0x20;
/// IOCON: interrupt output as open drain.
pub(crate) const IOCON_ODR: u8 = 0x04;

/// Register layout of one MCP230xx variant.
pub trait PortRegs {
    /// Per-port direction registers (1 = input), port A first.
    const IODIR: &'static [u8];
    const IOCON: &'static [u8];
    const GPPU: &'static [u8];
    const GPIO: &'static [u8];
    /// Highest register address, the reset walks `0..=LAST_REG`.
    const LAST_REG: u8;

    fn pins() -> u8 {
        Self::IODIR.len() as u8 * 8
    }
}

pub struct Driver<T, REGS> {
    bus: T,
    addr: u8,
    _r: PhantomData<REGS>,
}

impl<T, REGS> Driver<T, REGS> {
    pub fn new(bus: T, addr: u8) -> Self {
        Self {
            bus,
            addr,
            _r: PhantomData,
        }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn release(self) -> T {
        self.bus
    }
}

impl<T: Transport, REGS: PortRegs> Driver<T, REGS> {
    fn port_of(&self, index: u8) -> Result<(usize, u8), ProtocolError> {
        if index >= REGS::pins() {
            return Err(ProtocolError::InvalidIndex(index));
        }
        Ok(((index / 8) as usize, 1 << (index % 8)))
    }

    /// Read IOCON of every port, then GPPU of every port, and compare against `iocon`.
    fn signature_is(&mut self, iocon: u8) -> Result<bool, ProtocolError> {
        let mut matches = true;
        for &reg in REGS::IOCON {
            matches &= self.bus.read_reg(self.addr, reg)? == iocon;
        }
        for &reg in REGS::GPPU {
            matches &= self.bus.read_reg(self.addr, reg)? == 0x00;
        }
        Ok(matches)
    }

    /// Write every register back to its power-on value, in address order.
    fn reset(&mut self) -> Result<(), ProtocolError> {
        for reg in 0..=REGS::LAST_REG {
            let value = if REGS::IODIR.contains(&reg) { 0xff } else { 0x00 };
            self.bus.write_reg(self.addr, reg, value)?;
        }
        Ok(())
    }

    pub fn set_pin_mode(&mut self, index: u8, dir: Direction) -> Result<(), ProtocolError> {
        let (port, mask) = self.port_of(index)?;
        self.bus
            .modify_reg(self.addr, REGS::IODIR[port], |iodir| match dir {
                Direction::Input => iodir | mask,
                Direction::Output => iodir & !mask,
            })?;
        Ok(())
    }

    /// Set the direction of every pin at once, a set bit makes the pin an input.
    pub fn set_pin_mode_all(&mut self, inputs: u16) -> Result<(), ProtocolError> {
        for (port, &reg) in REGS::IODIR.iter().enumerate() {
            self.bus.write_reg(self.addr, reg, (inputs >> (port * 8)) as u8)?;
        }
        Ok(())
    }

    pub fn write(&mut self, index: u8, level: bool) -> Result<(), ProtocolError> {
        let (port, mask) = self.port_of(index)?;
        self.bus.modify_reg(self.addr, REGS::GPIO[port], |gpio| {
            if level {
                gpio | mask
            } else {
                gpio & !mask
            }
        })?;
        Ok(())
    }

    pub fn read(&mut self, index: u8) -> Result<bool, ProtocolError> {
        let (port, mask) = self.port_of(index)?;
        Ok(self.bus.read_reg(self.addr, REGS::GPIO[port])? & mask != 0)
    }

    pub fn write_all(&mut self, levels: u16) -> Result<(), ProtocolError> {
        for (port, &reg) in REGS::GPIO.iter().enumerate() {
            self.bus.write_reg(self.addr, reg, (levels >> (port * 8)) as u8)?;
        }
        Ok(())
    }

    pub fn read_all(&mut self) -> Result<u16, ProtocolError> {
        let mut levels = 0u16;
        for (port, &reg) in REGS::GPIO.iter().enumerate() {
            levels |= (self.bus.read_reg(self.addr, reg)? as u16) << (port * 8);
        }
        Ok(levels)
    }
}

impl<T: Transport, REGS: PortRegs> Lifecycle for Driver<T, REGS> {
    fn init(&mut self, _delay: &mut impl DelayNs) -> Result<Transition, ProtocolError> {
        if self.signature_is(IOCON_SEQOP | IOCON_ODR)? {
            return Ok(Transition::AlreadyInState);
        }
        self.reset()?;
        for &reg in REGS::IOCON {
            self.bus.write_reg(self.addr, reg, IOCON_SEQOP | IOCON_ODR)?;
        }
        Ok(Transition::Performed)
    }

    fn deinit(&mut self) -> Result<Transition, ProtocolError> {
        if self.signature_is(0x00)? {
            return Ok(Transition::AlreadyInState);
        }
        self.reset()?;
        Ok(Transition::Performed)
    }
}
