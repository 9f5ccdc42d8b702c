//! Support for the `MCP23017` "16-Bit I/O Expander with Serial Interface"
//!
//! Datasheet: https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf
//!
//! The MCP23017 offers two eight-bit GPIO ports.  It has three address pins, so eight
//! devices can coexist on an I2C bus.
//!
//! Pins 0..7 are port A and pins 8..15 are port B.  When passing 16-bit values to this
//! driver, the upper byte corresponds to port B (pins 7..0) and the lower byte corresponds
//! to port A (pins 7..0).
use crate::driver::{Driver, PortRegs};

/// `MCP23017` on an I2C bus.
pub type Mcp23017<T> = Driver<T, Mcp23017Regs>;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// N.B.: These values are for BANK=0, which is the reset state of the chip (and this
/// driver does not change).
enum Regs {
    /// IODIR: input/output direction: 0=output; 1=input
    IODIRA = 0x00,
    IODIRB = 0x01,
    IPOLA = 0x02,
    IPOLB = 0x03,
    GPINTENA = 0x04,
    GPINTENB = 0x05,
    DEFVALA = 0x06,
    DEFVALB = 0x07,
    INTCONA = 0x08,
    INTCONB = 0x09,
    /// IOCON: configuration register, mirrored between both addresses
    IOCONA = 0x0a,
    IOCONB = 0x0b,
    /// GPPU: GPIO pull-ups
    GPPUA = 0x0c,
    GPPUB = 0x0d,
    INTFA = 0x0e,
    INTFB = 0x0f,
    INTCAPA = 0x10,
    INTCAPB = 0x11,
    /// GPIO: reflects logic level on pins
    GPIOA = 0x12,
    GPIOB = 0x13,
    /// OLAT: output latches
    OLATA = 0x14,
    OLATB = 0x15,
}

pub struct Mcp23017Regs;

impl PortRegs for Mcp23017Regs {
    const IODIR: &'static [u8] = &[Regs::IODIRA as u8, Regs::IODIRB as u8];
    const IOCON: &'static [u8] = &[Regs::IOCONA as u8, Regs::IOCONB as u8];
    const GPPU: &'static [u8] = &[Regs::GPPUA as u8, Regs::GPPUB as u8];
    const GPIO: &'static [u8] = &[Regs::GPIOA as u8, Regs::GPIOB as u8];
    const LAST_REG: u8 = Regs::OLATB as u8;
}
