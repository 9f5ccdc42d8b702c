//! Support for the `ADS1015` "12-bit, 3.3-kSPS, 4-channel delta-sigma ADC"
//!
//! Datasheet: https://www.ti.com/lit/ds/symlink/ads1015.pdf
//!
//! Every read is a single-shot conversion of one input against GND with a full scale of
//! ±4.096 V at 1600 samples per second.
use embedded_hal::delay::DelayNs;

use crate::{Lifecycle, ProtocolError, Transition, Transport};

pub const CHANNELS: u8 = 4;

/// Conversion time at 1600 SPS with some margin.
const CONVERSION_TIME_US: u32 = 650;

/// Offset error below zero that [`Ads1015::read_unsigned`] still reports as zero.
const ZERO_TOLERANCE: i16 = -7;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    Conversion = 0x00,
    Config = 0x01,
    LoThresh = 0x02,
    HiThresh = 0x03,
}

// Config register, high byte
const OS_START: u8 = 0x80;
const MUX_AIN0: u8 = 0x40;
const PGA_4_096V: u8 = 0x02;
const MODE_SINGLE: u8 = 0x01;

// Config register, low byte
const DR_1600SPS: u8 = 0x80;
const COMP_QUEUE_NONE: u8 = 0x03;

pub struct Ads1015<T> {
    bus: T,
    addr: u8,
}

impl<T: Transport> Ads1015<T> {
    pub fn new(bus: T, addr: u8) -> Self {
        Self { bus, addr }
    }

    /// Convert input `channel` and return the signed 12-bit result.
    pub fn read(&mut self, channel: u8, delay: &mut impl DelayNs) -> Result<i16, ProtocolError> {
        if channel >= CHANNELS {
            return Err(ProtocolError::InvalidIndex(channel));
        }
        let mux = MUX_AIN0 + (channel << 4);
        self.bus.write(
            self.addr,
            &[
                Regs::Config as u8,
                OS_START | mux | PGA_4_096V | MODE_SINGLE,
                DR_1600SPS | COMP_QUEUE_NONE,
            ],
        )?;

        delay.delay_us(CONVERSION_TIME_US);

        let mut buf = [0x00; 2];
        self.bus
            .write_read(self.addr, &[Regs::Conversion as u8], &mut buf)?;
        let raw = u16::from_be_bytes(buf);
        if raw & 0x000f != 0 {
            return Err(ProtocolError::InvalidConversion(raw));
        }
        Ok(raw as i16 >> 4)
    }

    /// Like [`read`](Self::read) but clamps small negative offsets to zero.
    pub fn read_unsigned(
        &mut self,
        channel: u8,
        delay: &mut impl DelayNs,
    ) -> Result<u16, ProtocolError> {
        match self.read(channel, delay)? {
            v if v >= 0 => Ok(v as u16),
            v if v >= ZERO_TOLERANCE => Ok(0),
            v => Err(ProtocolError::ConversionOutOfRange(v)),
        }
    }
}

impl<T: Transport> Lifecycle for Ads1015<T> {
    /// Run one conversion on AIN0 to check the chip answers.
    fn init(&mut self, delay: &mut impl DelayNs) -> Result<Transition, ProtocolError> {
        self.read(0, delay)?;
        Ok(Transition::Performed)
    }

    fn deinit(&mut self) -> Result<Transition, ProtocolError> {
        Ok(Transition::Performed)
    }
}
