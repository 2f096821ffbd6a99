//! Register map of the DS3231 RTC.
//!
//! This module contains the register addresses, the table of named bit fields
//! the driver exposes, and typed views of the control and status registers.

use bitfield::bitfield;

use crate::field::Field;

/// Address of every DS3231 register. Multi-byte reads and writes auto-increment
/// from the given address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    // timekeeping block, BCD
    Seconds = 0x00,
    Minutes = 0x01,
    Hours = 0x02,
    Day = 0x03,
    Date = 0x04,
    Month = 0x05,
    Year = 0x06,
    // alarm 1 block, BCD
    Alarm1Seconds = 0x07,
    Alarm1Minutes = 0x08,
    Alarm1Hours = 0x09,
    Alarm1DayDate = 0x0A,
    // alarm 2 block, BCD, no seconds
    Alarm2Minutes = 0x0B,
    Alarm2Hours = 0x0C,
    Alarm2DayDate = 0x0D,
    /// EOSC, BBSQW, CONV, RS2:RS1, INTCN, A2IE, A1IE
    Control = 0x0E,
    /// OSF, EN32kHz, BSY, A2F, A1F
    ControlStatus = 0x0F,
    /// Signed crystal trim
    AgingOffset = 0x10,
    /// Signed integer part of the temperature
    MSBTemp = 0x11,
    /// Quarter degrees in bits 7:6
    LSBTemp = 0x12,
}

/// Alarm 1 interrupt enable (A1IE).
pub const ALARM1_INTERRUPT_ENABLE: Field = Field::flag(RegAddr::Control, 0);
/// Alarm 2 interrupt enable (A2IE).
pub const ALARM2_INTERRUPT_ENABLE: Field = Field::flag(RegAddr::Control, 1);
/// INT/SQW pin function (INTCN).
pub const INTERRUPT_CONTROL: Field = Field::flag(RegAddr::Control, 2);
/// Square wave rate select (RS2:RS1).
pub const SQUARE_WAVE_FREQUENCY: Field = Field::bits(RegAddr::Control, 3, 2);
/// Start a temperature conversion; cleared by the chip when done (CONV).
pub const CONVERT_TEMPERATURE: Field = Field::flag(RegAddr::Control, 5);
/// Square wave output on battery power (BBSQW).
pub const BATTERY_BACKED_SQUARE_WAVE: Field = Field::flag(RegAddr::Control, 6);
/// Stops the oscillator when running on battery (EOSC, active high).
pub const OSCILLATOR_DISABLE: Field = Field::flag(RegAddr::Control, 7);

/// Alarm 1 matched (A1F).
pub const ALARM1_FLAG: Field = Field::flag(RegAddr::ControlStatus, 0);
/// Alarm 2 matched (A2F).
pub const ALARM2_FLAG: Field = Field::flag(RegAddr::ControlStatus, 1);
/// A temperature conversion is running (BSY).
pub const BUSY: Field = Field::flag(RegAddr::ControlStatus, 2);
/// 32 kHz output enable (EN32kHz).
pub const ENABLE_32KHZ_OUTPUT: Field = Field::flag(RegAddr::ControlStatus, 3);
/// The oscillator stopped at some point, the time may be invalid (OSF).
pub const OSCILLATOR_STOP_FLAG: Field = Field::flag(RegAddr::ControlStatus, 7);

/// Aging offset, -128 to +127.
pub const AGING_OFFSET: Field = Field::signed(RegAddr::AgingOffset, 0, 8);
/// Temperature in quarter degrees Celsius, spread over MSB and the top two bits of LSB.
pub const TEMPERATURE: Field = Field::signed(RegAddr::MSBTemp, 6, 10).msb_first();

/// EOSC setting, as seen by [`Control::oscillator`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Runs on battery too
    Enabled = 0,
    /// Stops once on battery
    Disabled = 1,
}
impl From<u8> for Oscillator {
    /// # Panics
    /// On anything but the EOSC bit value (0 or 1).
    fn from(v: u8) -> Self {
        match v {
            0 => Oscillator::Enabled,
            1 => Oscillator::Disabled,
            _ => panic!("EOSC is a single bit, got {}", v),
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// What the INT/SQW pin outputs (INTCN).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// The square wave selected by RS2:RS1
    SquareWave = 0,
    /// Active-low alarm interrupt
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// # Panics
    /// On anything but the INTCN bit value (0 or 1).
    fn from(v: u8) -> Self {
        match v {
            0 => InterruptControl::SquareWave,
            1 => InterruptControl::Interrupt,
            _ => panic!("INTCN is a single bit, got {}", v),
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave rate (RS2:RS1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz
    Hz1 = 0b00,
    /// 1.024 kHz
    Hz1024 = 0b01,
    /// 4.096 kHz
    Hz4096 = 0b10,
    /// 8.192 kHz (power-on default)
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    /// # Panics
    /// On values wider than the two RS bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            0b11 => SquareWaveFrequency::Hz8192,
            _ => panic!("RS2:RS1 is two bits, got {}", v),
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

// Raw byte conversions for the bitfield register views
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Whole-byte view of the control register (0x0E).
    ///
    /// Bit positions agree with the named fields above.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// EOSC
    pub from into Oscillator, oscillator, set_oscillator: 7, 7;
    /// BBSQW
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV
    pub convert_temperature, set_convert_temperature: 5;
    /// RS2:RS1
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INTCN
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// A2IE
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// A1IE
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control(EOSC={}, BBSQW={}, CONV={}, RS={}, INTCN={}, A2IE={}, A1IE={})",
            self.oscillator(),
            self.battery_backed_square_wave(),
            self.convert_temperature(),
            self.square_wave_frequency(),
            self.interrupt_control(),
            self.alarm2_interrupt_enable(),
            self.alarm1_interrupt_enable()
        );
    }
}

bitfield! {
    /// Whole-byte view of the control/status register (0x0F).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// OSF, write false to clear
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// EN32kHz
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// BSY, read-only on the chip
    pub busy, set_busy: 2;
    /// A2F, write false to clear
    pub alarm2_flag, set_alarm2_flag: 1;
    /// A1F, write false to clear
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(OSF={}, EN32kHz={}, BSY={}, A2F={}, A1F={})",
            self.oscillator_stop_flag(),
            self.enable_32khz_output(),
            self.busy(),
            self.alarm2_flag(),
            self.alarm1_flag()
        );
    }
}
