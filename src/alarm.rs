//! Alarm register utilities for the DS3231 RTC.
//!
//! The DS3231 has two alarms. Alarm 1 occupies four registers starting at
//! 0x07 (seconds, minutes, hours, day) and can match down to the second.
//! Alarm 2 occupies three registers starting at 0x0B (minutes, hours, day) and
//! matches at 00 seconds of its minute.
//!
//! Only date-of-month matching is supported. Every field is BCD encoded with
//! the match-mask and day/date select bits left clear; a field that is `None`
//! is written as zero rather than masked out. On read the mask and select bits
//! are dropped before decoding.

use crate::{bcd, registers::RegAddr};

const SECONDS_MASK: u8 = 0x7F;
const MINUTES_MASK: u8 = 0x7F;
const HOURS_MASK: u8 = 0x3F;
const DAY_DATE_MASK: u8 = 0x3F;

/// Largest alarm register block (alarm 1).
pub(crate) const MAX_ALARM_LEN: usize = 4;

/// Selects one of the two alarm register blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSlot {
    /// Alarm 1: seconds, minutes, hours, day
    One,
    /// Alarm 2: minutes, hours, day
    Two,
}

impl AlarmSlot {
    /// First register of the block.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            AlarmSlot::One => RegAddr::Alarm1Seconds,
            AlarmSlot::Two => RegAddr::Alarm2Minutes,
        }
    }

    /// Number of registers in the block.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            AlarmSlot::One => 4,
            AlarmSlot::Two => 3,
        }
    }

    /// Whether the block stores a seconds field.
    #[must_use]
    pub const fn has_seconds(self) -> bool {
        matches!(self, AlarmSlot::One)
    }
}

/// Alarm match time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    /// Day of month, 1-31
    pub day: Option<u8>,
    /// Hour, 0-23
    pub hour: Option<u8>,
    /// Minute, 0-59
    pub minute: Option<u8>,
    /// Second, 0-59 (alarm 1 only)
    pub second: Option<u8>,
}

impl Alarm {
    /// Decodes an alarm register block.
    ///
    /// Every field stored by `slot` decodes to `Some`; alarm 2 has no seconds.
    ///
    /// # Panics
    /// Panics if `data` is shorter than `slot.len()`.
    #[must_use]
    pub fn from_registers(slot: AlarmSlot, data: &[u8]) -> Self {
        let (second, rest) = if slot.has_seconds() {
            (Some(bcd::decode(data[0] & SECONDS_MASK)), &data[1..])
        } else {
            (None, data)
        };
        Self {
            second,
            minute: Some(bcd::decode(rest[0] & MINUTES_MASK)),
            hour: Some(bcd::decode(rest[1] & HOURS_MASK)),
            day: Some(bcd::decode(rest[2] & DAY_DATE_MASK)),
        }
    }

    /// Encodes the alarm into `slot`'s register layout.
    ///
    /// Returns the buffer and the number of bytes used. Absent fields encode as
    /// zero; `second` is ignored for alarm 2.
    #[must_use]
    pub fn to_registers(&self, slot: AlarmSlot) -> ([u8; MAX_ALARM_LEN], usize) {
        let encode = |field: Option<u8>| field.map_or(0x00, bcd::encode);
        let mut data = [0u8; MAX_ALARM_LEN];
        let rest = if slot.has_seconds() {
            data[0] = encode(self.second);
            &mut data[1..]
        } else {
            &mut data[..]
        };
        rest[0] = encode(self.minute);
        rest[1] = encode(self.hour);
        rest[2] = encode(self.day);
        (data, slot.len())
    }
}
