//! Support for the `PCA9685` "16-channel, 12-bit PWM Fm+ I2C-bus LED controller"
//!
//! Datasheet: https://www.nxp.com/docs/en/data-sheet/PCA9685.pdf
//!
//! Every channel has an ON and an OFF counter value.  This driver always starts the pulse
//! at tick 0 and only moves the OFF edge.  Digital on and off use the dedicated full-on
//! and full-off bits instead of counter values.
use embedded_hal::delay::DelayNs;

use crate::bus::I2cExt;
use crate::{Lifecycle, ProtocolError, Transition, Transport};

/// Number of output channels.
pub const CHANNELS: usize = 16;
/// Largest PWM value, the counter is 12 bits wide.
pub const MAX_PWM: u16 = 4095;
/// Internal oscillator frequency.
pub const OSC_CLOCK_HZ: u32 = 25_000_000;
/// PWM frequency band reachable with the internal oscillator.
pub const MIN_FREQUENCY_HZ: u32 = 24;
pub const MAX_FREQUENCY_HZ: u32 = 1526;
/// Lowest value the prescaler register accepts.
pub const MIN_PRESCALER: u8 = 3;
/// Prescaler programmed by `init`, about 500 Hz.
pub const DEFAULT_PRESCALER: u8 = 11;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    Mode1 = 0x00,
    Mode2 = 0x01,
    SubAdr1 = 0x02,
    SubAdr2 = 0x03,
    SubAdr3 = 0x04,
    AllCallAdr = 0x05,
    /// LED0_ON_L, the other channels follow every 4 registers
    Led0 = 0x06,
    AllLedOnL = 0xfa,
    AllLedOnH = 0xfb,
    AllLedOffL = 0xfc,
    AllLedOffH = 0xfd,
    PreScale = 0xfe,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

const MODE1_ALLCALL: u8 = 0x01;
const MODE1_SLEEP: u8 = 0x10;
const MODE1_AI: u8 = 0x20;
const MODE2_OUTDRV: u8 = 0x04;

/// Bit 4 of LEDn_ON_H and LEDn_OFF_H.
const FULL: u8 = 0x10;

const DEFAULT_MODE1: u8 = MODE1_SLEEP | MODE1_ALLCALL;
const DEFAULT_MODE2: u8 = MODE2_OUTDRV;
const DEFAULT_SUBADR: [u8; 3] = [0xe2, 0xe4, 0xe8];
const DEFAULT_ALLCALLADR: u8 = 0xe0;
const DEFAULT_PRE_SCALE: u8 = 0x1e;

/// Register pointer plus the four LEDn registers of every channel.
type LedFrame = [u8; 1 + 4 * CHANNELS];

fn led_reg(channel: u8) -> u8 {
    Regs::Led0 as u8 + 4 * channel
}

fn on_bytes(on: bool) -> [u8; 4] {
    if on {
        [0x00, FULL, 0x00, 0x00]
    } else {
        [0x00, 0x00, 0x00, FULL]
    }
}

fn pwm_bytes(value: u16) -> [u8; 4] {
    [0x00, 0x00, (value & 0xff) as u8, ((value >> 8) & 0x0f) as u8]
}

/// Prescaler for `hz`: `round(25 MHz / (4096 * hz)) - 1`.
pub fn prescaler_for(hz: u32) -> Result<u8, ProtocolError> {
    if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&hz) {
        return Err(ProtocolError::FrequencyOutOfRange(hz));
    }
    let ticks = 4096 * hz;
    let prescaler = (OSC_CLOCK_HZ + ticks / 2) / ticks - 1;
    u8::try_from(prescaler).map_err(|_| ProtocolError::PrescalerOverflow(prescaler))
}

/// `PCA9685` at one address on a bus.
pub struct Pca9685<T> {
    bus: T,
    addr: u8,
}

impl<T: Transport> Pca9685<T> {
    pub fn new(bus: T, addr: u8) -> Self {
        Self { bus, addr }
    }

    fn check_channel(channel: u8) -> Result<(), ProtocolError> {
        if channel as usize >= CHANNELS {
            return Err(ProtocolError::InvalidIndex(channel));
        }
        Ok(())
    }

    fn set_led(&mut self, channel: u8, bytes: [u8; 4]) -> Result<(), ProtocolError> {
        let [on_l, on_h, off_l, off_h] = bytes;
        self.bus
            .write(self.addr, &[led_reg(channel), on_l, on_h, off_l, off_h])?;
        Ok(())
    }

    fn write_frame(&mut self, mut bytes: impl FnMut(usize) -> [u8; 4]) -> Result<(), ProtocolError> {
        let mut frame: LedFrame = [0; 1 + 4 * CHANNELS];
        frame[0] = Regs::Led0 as u8;
        for (channel, led) in frame[1..].chunks_exact_mut(4).enumerate() {
            led.copy_from_slice(&bytes(channel));
        }
        self.bus.write(self.addr, &frame)?;
        Ok(())
    }

    /// Switch a channel fully on or fully off.
    pub fn write(&mut self, channel: u8, on: bool) -> Result<(), ProtocolError> {
        Self::check_channel(channel)?;
        self.set_led(channel, on_bytes(on))
    }

    /// Switch all channels at once, bit *n* of `mask` drives channel *n*.
    pub fn write_all(&mut self, mask: u16) -> Result<(), ProtocolError> {
        self.write_frame(|channel| on_bytes(mask & (1 << channel) != 0))
    }

    /// Set the duty cycle of one channel to `value / 4096`.
    pub fn pwm_write(&mut self, channel: u8, value: u16) -> Result<(), ProtocolError> {
        Self::check_channel(channel)?;
        if value > MAX_PWM {
            return Err(ProtocolError::ValueOutOfRange(value));
        }
        self.set_led(channel, pwm_bytes(value))
    }

    /// Set the duty cycle of every channel in a single transfer.
    ///
    /// All values are checked before anything is sent.
    pub fn pwm_write_all(&mut self, values: &[u16; CHANNELS]) -> Result<(), ProtocolError> {
        if let Some(&bad) = values.iter().find(|&&v| v > MAX_PWM) {
            return Err(ProtocolError::ValueOutOfRange(bad));
        }
        self.write_frame(|channel| pwm_bytes(values[channel]))
    }

    /// Program the raw prescaler.  The oscillator has to be asleep while it changes.
    pub fn set_prescaler(&mut self, prescaler: u8) -> Result<(), ProtocolError> {
        if prescaler < MIN_PRESCALER {
            return Err(ProtocolError::PrescalerOutOfRange(prescaler));
        }
        let mode1 = self.bus.read_reg(self.addr, Regs::Mode1)?;
        self.bus
            .write_reg(self.addr, Regs::Mode1, mode1 | MODE1_SLEEP)?;
        self.bus.write_reg(self.addr, Regs::PreScale, prescaler)?;
        let mode1 = self.bus.read_reg(self.addr, Regs::Mode1)?;
        self.bus
            .write_reg(self.addr, Regs::Mode1, mode1 & !MODE1_SLEEP)?;
        Ok(())
    }

    /// Set the PWM frequency shared by all channels.
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), ProtocolError> {
        let prescaler = prescaler_for(hz)?;
        self.set_prescaler(prescaler)
    }

    fn reset(&mut self) -> Result<(), ProtocolError> {
        // MODE1 through the last LED register, with auto-increment on for this write only
        let mut regs = [0u8; 1 + 6 + 4 * CHANNELS];
        regs[0] = Regs::Mode1 as u8;
        regs[1] = DEFAULT_MODE1 | MODE1_AI;
        regs[2] = DEFAULT_MODE2;
        regs[3..6].copy_from_slice(&DEFAULT_SUBADR);
        regs[6] = DEFAULT_ALLCALLADR;
        for led in regs[7..].chunks_exact_mut(4) {
            led[3] = FULL;
        }
        self.bus.write(self.addr, &regs)?;

        self.bus.write(
            self.addr,
            &[
                Regs::AllLedOnL as u8,
                0x00,
                0x20,
                0x00,
                0x20,
                DEFAULT_PRE_SCALE,
            ],
        )?;
        self.bus.write_reg(self.addr, Regs::Mode1, DEFAULT_MODE1)?;
        Ok(())
    }
}

impl<T: Transport> Lifecycle for Pca9685<T> {
    fn init(&mut self, _delay: &mut impl DelayNs) -> Result<Transition, ProtocolError> {
        let mode1 = self.bus.read_reg(self.addr, Regs::Mode1)?;
        let mode2 = self.bus.read_reg(self.addr, Regs::Mode2)?;
        if mode1 == MODE1_AI && mode2 == MODE2_OUTDRV {
            return Ok(Transition::AlreadyInState);
        }

        self.reset()?;
        self.bus
            .write_reg(self.addr, Regs::Mode1, MODE1_SLEEP | MODE1_AI)?;
        self.bus.write_reg(self.addr, Regs::Mode2, MODE2_OUTDRV)?;
        self.bus
            .write_reg(self.addr, Regs::PreScale, DEFAULT_PRESCALER)?;
        self.bus.write_reg(self.addr, Regs::Mode1, MODE1_AI)?;
        Ok(Transition::Performed)
    }

    fn deinit(&mut self) -> Result<Transition, ProtocolError> {
        let mode1 = self.bus.read_reg(self.addr, Regs::Mode1)?;
        let mode2 = self.bus.read_reg(self.addr, Regs::Mode2)?;
        let prescale = self.bus.read_reg(self.addr, Regs::PreScale)?;
        if mode1 == DEFAULT_MODE1 && mode2 == DEFAULT_MODE2 && prescale == DEFAULT_PRE_SCALE {
            return Ok(Transition::AlreadyInState);
        }

        self.reset()?;
        Ok(Transition::Performed)
    }
}
