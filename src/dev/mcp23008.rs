//! Support for the `MCP23008` "8-Bit I/O Expander with Serial Interface"
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/DeviceDoc/MCP23008-MCP23S08-Data-Sheet-20001919F.pdf
//!
//! A single eight-bit port.  Multi-pin values use the low byte only.
use crate::driver::{Driver, PortRegs};

/// `MCP23008` on an I2C bus.
pub type Mcp23008<T> = Driver<T, Mcp23008Regs>;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// For all registers, the reset value is 0x00, except for IODIR which is 0xFF (all pins
/// inputs) at reset.
enum Regs {
    /// IODIR: input/output direction: 0=output; 1=input
    Iodir = 0x00,
    /// IPOL: input polarity
    Ipol = 0x01,
    /// GPINTEN: interrupt-on-change enable
    Gpinten = 0x02,
    Defval = 0x03,
    Intcon = 0x04,
    /// IOCON: configuration register
    /// - Bit 5: SEQOP: disables the address pointer auto-increment
    /// - Bit 4: DISSLW: disables slew rate control on SDA
    /// - Bit 2: ODR: interrupt pin as open-drain output
    /// - Bit 1: INTPOL: interrupt polarity
    Iocon = 0x05,
    /// GPPU: weak pull-ups for pins configured as inputs
    Gppu = 0x06,
    Intf = 0x07,
    Intcap = 0x08,
    /// GPIO: reflects logic level on pins, writes go to OLAT
    Gpio = 0x09,
    Olat = 0x0a,
}

pub struct Mcp23008Regs;

impl PortRegs for Mcp23008Regs {
    const IODIR: &'static [u8] = &[Regs::Iodir as u8];
    const IOCON: &'static [u8] = &[Regs::Iocon as u8];
    const GPPU: &'static [u8] = &[Regs::Gppu as u8];
    const GPIO: &'static [u8] = &[Regs::Gpio as u8];
    const LAST_REG: u8 = Regs::Olat as u8;
}
