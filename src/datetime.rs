//! `DateTime` conversion and register utilities for the DS3231 RTC.
//!
//! The DS3231 stores date and time in 7 consecutive BCD registers starting at
//! 0x00: seconds, minutes, hours, weekday, date, month and year. This module
//! maps that block to and from [`DateTime`], and converts [`DateTime`] to and
//! from chrono's `NaiveDateTime` and Unix timestamps.
//!
//! # Register Model
//!
//! Decoding masks the control bits that share a byte with a field (the 12/24
//! hour select and the century flag) before BCD decoding. Encoding always
//! writes 24-hour mode with the century flag clear, the year being stored as an
//! offset from 2000. The raw codec does not validate: out-of-range fields
//! produce malformed register bytes, malformed bytes produce wrong values.
//!
//! # Error Handling
//!
//! Only the chrono conversions validate, reporting failures via [`DateTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::bcd;

/// Length of the date/time register block.
pub(crate) const DATETIME_LEN: usize = 7;

// Field bits of each date/time register, in register order.
const SECONDS_MASK: u8 = 0x7F;
const MINUTES_MASK: u8 = 0x7F;
const HOURS_MASK: u8 = 0x3F;
const WEEKDAY_MASK: u8 = 0x07;
const DATE_MASK: u8 = 0x3F;
const MONTH_MASK: u8 = 0x1F;

const BASE_YEAR: u16 = 2000;

/// Calendar date and time as held by the RTC.
///
/// Milliseconds are not supported by the chip and have no field here.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Absolute year, 2000-2099
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
    /// Day of week, 0-6 or 1-7 as chosen by the application
    pub weekday: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
}

impl DateTime {
    /// Decodes the 7-byte date/time register block.
    #[must_use]
    pub fn from_registers(data: &[u8; DATETIME_LEN]) -> Self {
        Self {
            second: bcd::decode(data[0] & SECONDS_MASK),
            minute: bcd::decode(data[1] & MINUTES_MASK),
            hour: bcd::decode(data[2] & HOURS_MASK),
            weekday: bcd::decode(data[3] & WEEKDAY_MASK),
            day: bcd::decode(data[4] & DATE_MASK),
            month: bcd::decode(data[5] & MONTH_MASK),
            year: BASE_YEAR + u16::from(bcd::decode(data[6])),
        }
    }

    /// Encodes the 7-byte date/time register block (24-hour mode).
    #[must_use]
    pub fn to_registers(&self) -> [u8; DATETIME_LEN] {
        [
            bcd::encode(self.second),
            bcd::encode(self.minute),
            bcd::encode(self.hour),
            bcd::encode(self.weekday),
            bcd::encode(self.day),
            bcd::encode(self.month),
            bcd::encode(self.year.wrapping_sub(BASE_YEAR) as u8),
        ]
    }

    /// Seconds since the Unix epoch, reading the date/time as UTC.
    ///
    /// # Errors
    /// Returns [`DateTimeError::InvalidDateTime`] if the fields do not form a
    /// real calendar date and time.
    pub fn timestamp(&self) -> Result<i64, DateTimeError> {
        let ndt = NaiveDateTime::try_from(*self)?;
        Ok(ndt.and_utc().timestamp())
    }

    /// Builds a date/time from seconds since the Unix epoch (UTC).
    ///
    /// The weekday is set to days since Sunday (0-6).
    ///
    /// # Errors
    /// Returns [`DateTimeError::InvalidDateTime`] if the timestamp is out of
    /// chrono's range and [`DateTimeError::YearOutOfRange`] if it is outside
    /// 2000-2099.
    pub fn from_timestamp(secs: i64) -> Result<Self, DateTimeError> {
        match chrono::DateTime::from_timestamp(secs, 0) {
            Some(utc) => Self::try_from(&utc.naive_utc()),
            None => Err(DateTimeError::InvalidDateTime),
        }
    }
}

impl TryFrom<&NaiveDateTime> for DateTime {
    type Error = DateTimeError;

    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        let year = datetime.year();
        if !(2000..=2099).contains(&year) {
            error!("Year {} is outside 2000-2099", year);
            return Err(DateTimeError::YearOutOfRange);
        }
        // every field is range checked by now, so the casts are lossless
        Ok(Self {
            year: year as u16,
            month: datetime.month() as u8,
            day: datetime.day() as u8,
            weekday: datetime.weekday().num_days_from_sunday() as u8,
            hour: datetime.hour() as u8,
            minute: datetime.minute() as u8,
            second: datetime.second() as u8,
        })
    }
}

impl TryFrom<DateTime> for NaiveDateTime {
    type Error = DateTimeError;

    /// The weekday field is ignored; chrono derives it from the date.
    fn try_from(dt: DateTime) -> Result<Self, Self::Error> {
        let date = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into());
        let time = NaiveTime::from_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into());
        match (date, time) {
            (Some(date), Some(time)) => Ok(date.and_time(time)),
            _ => Err(DateTimeError::InvalidDateTime),
        }
    }
}

/// Errors that can occur when converting a [`DateTime`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The fields do not form a real date/time (e.g. February 30th)
    InvalidDateTime,
    /// The year cannot be stored by the chip (must be 2000-2099)
    YearOutOfRange,
}
