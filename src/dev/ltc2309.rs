//! Support for the `LTC2309` "8-Channel, 12-Bit SAR ADC with I2C Interface"
//!
//! Datasheet: https://www.analog.com/media/en/technical-documentation/data-sheets/2309fd.pdf
//!
//! The chip has no registers.  A one-byte input word selects the channel and starts a
//! conversion, the result is read back as two bytes, MSB first and left aligned.
use embedded_hal::delay::DelayNs;

use crate::{Lifecycle, ProtocolError, Transition, Transport};

pub const CHANNELS: u8 = 8;

/// The chip needs 1.6 µs between the input word and the result.
const CONVERSION_TIME_US: u32 = 5;

/// Single-ended, unipolar input word for every channel.
///
/// The channel bits are not in natural order, odd channels set the ODD/SIGN bit.
const CHANNEL_WORD: [u8; CHANNELS as usize] = [
    0b1000_1000,
    0b1100_1000,
    0b1001_1000,
    0b1101_1000,
    0b1010_1000,
    0b1110_1000,
    0b1011_1000,
    0b1111_1000,
];

pub struct Ltc2309<T> {
    bus: T,
    addr: u8,
}

impl<T: Transport> Ltc2309<T> {
    pub fn new(bus: T, addr: u8) -> Self {
        Self { bus, addr }
    }

    /// Convert `channel` and return the 12-bit result.
    pub fn read(&mut self, channel: u8, delay: &mut impl DelayNs) -> Result<u16, ProtocolError> {
        let word = *CHANNEL_WORD
            .get(channel as usize)
            .ok_or(ProtocolError::InvalidIndex(channel))?;
        self.bus.write(self.addr, &[word])?;

        delay.delay_us(CONVERSION_TIME_US);

        let mut buf = [0x00; 2];
        self.bus.read(self.addr, &mut buf)?;
        Ok(((buf[0] as u16) << 4) | (buf[1] as u16 >> 4))
    }
}

impl<T: Transport> Lifecycle for Ltc2309<T> {
    fn init(&mut self, delay: &mut impl DelayNs) -> Result<Transition, ProtocolError> {
        self.read(0, delay)?;
        Ok(Transition::Performed)
    }

    fn deinit(&mut self) -> Result<Transition, ProtocolError> {
        Ok(Transition::Performed)
    }
}
