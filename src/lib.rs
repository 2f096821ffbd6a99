//! A register-level driver for the DS3231 precision real-time clock.
//!
//! The driver exposes the chip's calendar, both alarms, the aging offset and
//! the temperature sensor over any bus implementing [`RegisterBus`] (every
//! `embedded-hal` I2C bus does). The driver keeps no copy of device state:
//! every call goes to the bus, and single-flag writes are read-modify-write
//! sequences that leave neighbouring bits untouched.
//!
//! # Features
//!
//! - `async`: async facade in [`asynch`] over `embedded-hal-async` buses
//! - `log` / `defmt`: route driver logging to the respective framework
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::{DateTime, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! if rtc.lost_power()? {
//!     let now = DateTime::from_timestamp(1_710_430_200)?;
//!     rtc.set_datetime(&now)?;
//! }
//! let now = rtc.datetime()?;
//! let celsius = rtc.force_temperature_conversion()?;
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod bus;
pub mod datetime;
pub mod field;
pub mod registers;
#[cfg(test)]
mod sim;

pub use alarm::{Alarm, AlarmSlot};
#[cfg(feature = "async")]
pub use bus::AsyncRegisterBus;
pub use bus::RegisterBus;
pub use datetime::{DateTime, DateTimeError};
pub use field::{ByteOrder, Field};
pub use registers::{Control, InterruptControl, Oscillator, RegAddr, SquareWaveFrequency, Status};

use alarm::MAX_ALARM_LEN;
use datetime::DATETIME_LEN;

/// Default I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Default number of polls while waiting for a temperature conversion.
pub const DEFAULT_POLL_LIMIT: u32 = 1000;

/// Widest field the driver reads or writes, in registers.
pub(crate) const MAX_FIELD_LEN: usize = 4;

/// Device configuration applied to the control register by `configure`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Whether the oscillator keeps running on battery power
    pub oscillator: Oscillator,
    /// Keep the square wave running on battery power
    pub battery_backed_square_wave: bool,
    /// Square wave output frequency
    pub square_wave_frequency: SquareWaveFrequency,
    /// INT/SQW pin function
    pub interrupt_control: InterruptControl,
}

impl Default for Config {
    /// The chip's power-on control settings.
    fn default() -> Self {
        Self {
            oscillator: Oscillator::Enabled,
            battery_backed_square_wave: false,
            square_wave_frequency: SquareWaveFrequency::Hz8192,
            interrupt_control: InterruptControl::Interrupt,
        }
    }
}

/// Errors returned by the driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DS3231Error<E> {
    /// The bus transaction failed
    Bus(E),
    /// A busy or conversion bit did not clear within the poll limit
    Unresponsive,
}

impl<E> From<E> for DS3231Error<E> {
    fn from(e: E) -> Self {
        DS3231Error::Bus(e)
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Owns its bus for its whole lifetime; `&mut self` on every operation keeps
/// read-modify-write sequences from interleaving on one instance.
pub struct DS3231<B> {
    bus: B,
    address: u8,
    poll_limit: u32,
}

impl<B: RegisterBus> DS3231<B> {
    /// Creates a new DS3231 driver instance.
    ///
    /// # Arguments
    /// * `bus` - The bus the chip is attached to
    /// * `address` - The I2C address of the device (typically [`DEFAULT_ADDRESS`])
    pub fn new(bus: B, address: u8) -> Self {
        Self {
            bus,
            address,
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }

    /// Limits how many times each wait in a temperature conversion polls the chip.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn with_poll_limit(mut self, limit: u32) -> Self {
        self.poll_limit = limit.max(1);
        self
    }

    /// Releases the bus.
    pub fn release(self) -> B {
        self.bus
    }

    fn read(
        &mut self,
        register: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        trace!("DS3231: read {:?} len={}", register, buffer.len());
        let address = self.address;
        self.bus.read_register(address, register as u8, buffer)?;
        Ok(())
    }

    fn write(&mut self, register: RegAddr, data: &[u8]) -> Result<(), DS3231Error<B::Error>> {
        trace!("DS3231: write {:?} {:?}", register, data);
        let address = self.address;
        self.bus.write_register(address, register as u8, data)?;
        Ok(())
    }

    /// Reads a bit field.
    ///
    /// # Panics
    /// Panics if the field spans more than four registers.
    pub fn read_bits(&mut self, field: Field) -> Result<i32, DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_FIELD_LEN];
        let data = &mut data[..field.len()];
        self.read(field.register, data)?;
        Ok(field.extract(data))
    }

    /// Writes a bit field with one read and one write of the registers it covers.
    ///
    /// # Panics
    /// Panics if the field spans more than four registers.
    pub fn write_bits(&mut self, field: Field, value: i32) -> Result<(), DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_FIELD_LEN];
        let data = &mut data[..field.len()];
        self.read(field.register, data)?;
        field.insert(data, value);
        self.write(field.register, data)
    }

    /// Returns whether any bit of `mask` is set in `register`.
    pub fn read_bit(
        &mut self,
        register: RegAddr,
        mask: u8,
    ) -> Result<bool, DS3231Error<B::Error>> {
        let mut data = [0u8];
        self.read(register, &mut data)?;
        Ok(data[0] & mask != 0)
    }

    /// Sets or clears the bits of `mask` in `register`, preserving all other bits.
    pub fn write_bit(
        &mut self,
        register: RegAddr,
        mask: u8,
        value: bool,
    ) -> Result<(), DS3231Error<B::Error>> {
        let mut data = [0u8];
        self.read(register, &mut data)?;
        if value {
            data[0] |= mask;
        } else {
            data[0] &= !mask;
        }
        self.write(register, &data)
    }

    /// Gets the current date and time from the device.
    pub fn datetime(&mut self) -> Result<DateTime, DS3231Error<B::Error>> {
        let mut data = [0u8; DATETIME_LEN];
        self.read(RegAddr::Seconds, &mut data)?;
        let datetime = DateTime::from_registers(&data);
        debug!("DS3231: datetime {:?}", datetime);
        Ok(datetime)
    }

    /// Sets the date and time.
    ///
    /// Setting the time also re-enables the oscillator and clears the
    /// oscillator stop flag, since the time is trustworthy again.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: set datetime {:?}", datetime);
        self.write(RegAddr::Seconds, &datetime.to_registers())?;
        self.set_oscillator_disabled(false)?;
        self.clear_lost_power()
    }

    /// Returns true if the oscillator stopped since the flag was last cleared,
    /// e.g. after a power loss with no battery; the time is then invalid.
    pub fn lost_power(&mut self) -> Result<bool, DS3231Error<B::Error>> {
        let field = registers::OSCILLATOR_STOP_FLAG;
        self.read_bit(field.register, field.byte_mask())
    }

    /// Clears the oscillator stop flag.
    pub fn clear_lost_power(&mut self) -> Result<(), DS3231Error<B::Error>> {
        let field = registers::OSCILLATOR_STOP_FLAG;
        self.write_bit(field.register, field.byte_mask(), false)
    }

    /// Reads an alarm.
    pub fn alarm(&mut self, slot: AlarmSlot) -> Result<Alarm, DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_ALARM_LEN];
        let data = &mut data[..slot.len()];
        self.read(slot.register(), data)?;
        let alarm = Alarm::from_registers(slot, data);
        debug!("DS3231: {:?} {:?}", slot, alarm);
        Ok(alarm)
    }

    /// Writes an alarm in one transaction. Absent fields are written as zero.
    pub fn set_alarm(
        &mut self,
        slot: AlarmSlot,
        alarm: &Alarm,
    ) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: set {:?} {:?}", slot, alarm);
        let (data, len) = alarm.to_registers(slot);
        self.write(slot.register(), &data[..len])
    }

    /// Reads alarm 1.
    pub fn alarm1(&mut self) -> Result<Alarm, DS3231Error<B::Error>> {
        self.alarm(AlarmSlot::One)
    }

    /// Writes alarm 1.
    pub fn set_alarm1(&mut self, alarm: &Alarm) -> Result<(), DS3231Error<B::Error>> {
        self.set_alarm(AlarmSlot::One, alarm)
    }

    /// Reads alarm 2 (`second` is always `None`).
    pub fn alarm2(&mut self) -> Result<Alarm, DS3231Error<B::Error>> {
        self.alarm(AlarmSlot::Two)
    }

    /// Writes alarm 2. Alarm 2 has no seconds register, so `second` is ignored.
    pub fn set_alarm2(&mut self, alarm: &Alarm) -> Result<(), DS3231Error<B::Error>> {
        self.set_alarm(AlarmSlot::Two, alarm)
    }

    /// Reads the aging offset.
    pub fn calibration(&mut self) -> Result<i8, DS3231Error<B::Error>> {
        Ok(self.read_bits(registers::AGING_OFFSET)? as i8)
    }

    /// Writes the aging offset, then forces a temperature conversion so the
    /// new offset takes effect immediately. Returns the new temperature.
    pub fn set_calibration(&mut self, offset: i8) -> Result<f32, DS3231Error<B::Error>> {
        debug!("DS3231: set aging offset {}", offset);
        self.write_bits(registers::AGING_OFFSET, i32::from(offset))?;
        self.force_temperature_conversion()
    }

    /// Reads the last converted temperature in degrees Celsius (0.25 resolution).
    pub fn temperature(&mut self) -> Result<f32, DS3231Error<B::Error>> {
        let raw = self.read_bits(registers::TEMPERATURE)?;
        Ok(raw as f32 / 4.0)
    }

    /// Runs a temperature conversion and returns the new temperature.
    ///
    /// Waits for any running conversion, starts a new one and waits for the
    /// chip to clear the start bit.
    ///
    /// # Errors
    /// Returns [`DS3231Error::Unresponsive`] if either wait exceeds the poll limit.
    pub fn force_temperature_conversion(&mut self) -> Result<f32, DS3231Error<B::Error>> {
        let convert = registers::CONVERT_TEMPERATURE;
        self.wait_while(registers::BUSY)?;
        self.write_bit(convert.register, convert.byte_mask(), true)?;
        self.wait_while(convert)?;
        let temperature = self.temperature()?;
        debug!("DS3231: temperature {}", temperature);
        Ok(temperature)
    }

    fn wait_while(&mut self, field: Field) -> Result<(), DS3231Error<B::Error>> {
        for _ in 0..self.poll_limit {
            if !self.read_bit(field.register, field.byte_mask())? {
                return Ok(());
            }
        }
        error!("DS3231: {:?} stuck after {} polls", field, self.poll_limit);
        Err(DS3231Error::Unresponsive)
    }

    /// Applies the configuration with one read-modify-write of the control register.
    ///
    /// The alarm interrupt enables are left as they are.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<B::Error>> {
        let mut control = self.control()?;
        control.set_oscillator(config.oscillator);
        control.set_battery_backed_square_wave(config.battery_backed_square_wave);
        control.set_square_wave_frequency(config.square_wave_frequency);
        control.set_interrupt_control(config.interrupt_control);
        debug!("DS3231: writing control: {:?}", control);
        self.set_control(control)
    }
}

// Whole-register access with the typed register views
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<B: RegisterBus> DS3231<B> {
            $(
                paste::paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, DS3231Error<B::Error>> {
                        let mut data = [0];
                        self.read($regaddr, &mut data)?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](
                        &mut self,
                        value: $typ,
                    ) -> Result<(), DS3231Error<B::Error>> {
                        self.write($regaddr, &[value.into()])
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status)
);

// Named single-bit properties, each a read or a read-modify-write of one register.
// The alarm status flags are cleared by writing `false`.
macro_rules! impl_flag_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<B: RegisterBus> DS3231<B> {
            $(
                paste::paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " flag.")]
                    pub fn $name(&mut self) -> Result<bool, DS3231Error<B::Error>> {
                        let field: Field = $field;
                        self.read_bit(field.register, field.byte_mask())
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " flag.")]
                    pub fn [<set_ $name>](
                        &mut self,
                        value: bool,
                    ) -> Result<(), DS3231Error<B::Error>> {
                        let field: Field = $field;
                        self.write_bit(field.register, field.byte_mask(), value)
                    }
                }
            )+
        }
    }
}

impl_flag_access!(
    (alarm1_interrupt, registers::ALARM1_INTERRUPT_ENABLE),
    (alarm2_interrupt, registers::ALARM2_INTERRUPT_ENABLE),
    (alarm1_status, registers::ALARM1_FLAG),
    (alarm2_status, registers::ALARM2_FLAG),
    (oscillator_disabled, registers::OSCILLATOR_DISABLE),
    (enable_32khz_output, registers::ENABLE_32KHZ_OUTPUT)
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedChip;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    type Setter = fn(&mut DS3231<SimulatedChip>, bool) -> Result<(), DS3231Error<ErrorKind>>;
    type Getter = fn(&mut DS3231<SimulatedChip>) -> Result<bool, DS3231Error<ErrorKind>>;

    fn flag_table() -> [(Getter, Setter, RegAddr, u8); 6] {
        [
            (
                DS3231::alarm1_interrupt,
                DS3231::set_alarm1_interrupt,
                RegAddr::Control,
                0b0000_0001,
            ),
            (
                DS3231::alarm2_interrupt,
                DS3231::set_alarm2_interrupt,
                RegAddr::Control,
                0b0000_0010,
            ),
            (
                DS3231::oscillator_disabled,
                DS3231::set_oscillator_disabled,
                RegAddr::Control,
                0b1000_0000,
            ),
            (
                DS3231::alarm1_status,
                DS3231::set_alarm1_status,
                RegAddr::ControlStatus,
                0b0000_0001,
            ),
            (
                DS3231::alarm2_status,
                DS3231::set_alarm2_status,
                RegAddr::ControlStatus,
                0b0000_0010,
            ),
            (
                DS3231::enable_32khz_output,
                DS3231::set_enable_32khz_output,
                RegAddr::ControlStatus,
                0b0000_1000,
            ),
        ]
    }

    #[test]
    fn test_read_datetime() {
        // 2024-03-14 15:30:00
        let mut i2c = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x00, 0x30, 0x15, 0x04, 0x14, 0x03, 0x24],
        )]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        let dt = dev.datetime().unwrap();
        assert_eq!(
            dt,
            DateTime {
                year: 2024,
                month: 3,
                day: 14,
                weekday: 4,
                hour: 15,
                minute: 30,
                second: 0,
            }
        );
        i2c.done();
    }

    #[test]
    fn test_set_datetime_bus_sequence() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![
                    RegAddr::Seconds as u8,
                    0x00, // seconds
                    0x30, // minutes
                    0x15, // hours
                    0x04, // weekday
                    0x14, // date
                    0x03, // month
                    0x24, // year
                ],
            ),
            // re-enable the oscillator, keeping the other control bits
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x9C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x1C]),
            // clear the oscillator stop flag, keeping the other status bits
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x8B],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x0B]),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        dev.set_datetime(&DateTime {
            year: 2024,
            month: 3,
            day: 14,
            weekday: 4,
            hour: 15,
            minute: 30,
            second: 0,
        })
        .unwrap();
        i2c.done();
    }

    #[test]
    fn test_set_datetime_clears_lost_power_and_oscillator_disable() {
        let mut chip = SimulatedChip::new();
        chip.registers[RegAddr::Control as usize] = 0x80 | 0x1C;
        chip.registers[RegAddr::ControlStatus as usize] = 0x80 | 0x03;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);
        assert!(dev.lost_power().unwrap());
        assert!(dev.oscillator_disabled().unwrap());

        let dt = DateTime {
            year: 2031,
            month: 7,
            day: 19,
            weekday: 6,
            hour: 8,
            minute: 9,
            second: 10,
        };
        dev.set_datetime(&dt).unwrap();

        assert!(!dev.lost_power().unwrap());
        assert!(!dev.oscillator_disabled().unwrap());
        assert_eq!(dev.datetime().unwrap(), dt);
        let chip = dev.release();
        assert_eq!(chip.registers[RegAddr::Control as usize], 0x1C);
        assert_eq!(chip.registers[RegAddr::ControlStatus as usize], 0x03);
    }

    #[test]
    fn test_datetime_round_trip_through_chip() {
        let mut dev = DS3231::new(SimulatedChip::new(), DEFAULT_ADDRESS);
        for year in [2000, 2024, 2099] {
            for month in 1..=12 {
                let dt = DateTime {
                    year,
                    month,
                    day: month * 2 + 7,
                    weekday: month % 7,
                    hour: month * 2 - 1,
                    minute: month * 5 - 1,
                    second: 60 - month * 5,
                };
                dev.set_datetime(&dt).unwrap();
                assert_eq!(dev.datetime().unwrap(), dt);
            }
        }
    }

    #[test]
    fn test_flags_preserve_other_bits() {
        for (get, set, register, mask) in flag_table() {
            for initial in [0x00u8, 0xFF, 0x5A, 0xA5, 0x1C] {
                for value in [true, false] {
                    let mut chip = SimulatedChip::new();
                    chip.registers[register as usize] = initial;
                    let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);

                    set(&mut dev, value).unwrap();
                    assert_eq!(get(&mut dev).unwrap(), value);

                    let chip = dev.release();
                    let after = chip.registers[register as usize];
                    let untouched = !mask;
                    assert_eq!(after & untouched, initial & untouched, "{:?}", register);
                    assert_eq!(after & mask != 0, value);
                }
            }
        }
    }

    #[test]
    fn test_flag_write_is_one_read_and_one_write() {
        let mut dev = DS3231::new(SimulatedChip::new(), DEFAULT_ADDRESS);
        dev.set_alarm2_interrupt(true).unwrap();
        let chip = dev.release();
        assert_eq!(chip.reads, vec![(RegAddr::Control as u8, 1)]);
        assert_eq!(chip.writes, vec![(RegAddr::Control as u8, vec![0x02])]);
    }

    #[test]
    fn test_flag_bus_sequences() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x83],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x83],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x82]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x1D]),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        assert!(dev.alarm1_status().unwrap());
        dev.set_alarm1_status(false).unwrap();
        dev.set_alarm1_interrupt(true).unwrap();
        i2c.done();
    }

    #[test]
    fn test_read_and_write_bits() {
        let mut chip = SimulatedChip::new();
        chip.registers[RegAddr::Control as usize] = 0b1110_0111;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);

        let rate = registers::SQUARE_WAVE_FREQUENCY;
        assert_eq!(dev.read_bits(rate).unwrap(), 0);
        dev.write_bits(rate, 0b10).unwrap();
        assert_eq!(dev.read_bits(rate).unwrap(), 0b10);
        assert!(dev.read_bit(RegAddr::Control, 0b1000_0000).unwrap());
        let mask = 0b0000_0011;
        dev.write_bit(RegAddr::Control, mask, false).unwrap();

        let chip = dev.release();
        assert_eq!(chip.registers[RegAddr::Control as usize], 0b1111_0100);
    }

    #[test]
    fn test_alarm1_bus_sequences() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8, 0x30, 0x45, 0x23, 0x15],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8],
                vec![0x30, 0x45, 0x23, 0x15],
            ),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        let alarm = Alarm {
            day: Some(15),
            hour: Some(23),
            minute: Some(45),
            second: Some(30),
        };
        dev.set_alarm1(&alarm).unwrap();
        assert_eq!(dev.alarm1().unwrap(), alarm);
        i2c.done();
    }

    #[test]
    fn test_alarm2_has_no_seconds_register() {
        let mut i2c = I2cMock::new(&[
            // three data bytes, nothing written to a seconds register
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm2Minutes as u8, 0x45, 0x23, 0x15],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm2Minutes as u8],
                vec![0x45, 0x23, 0x15],
            ),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        dev.set_alarm2(&Alarm {
            day: Some(15),
            hour: Some(23),
            minute: Some(45),
            second: Some(30),
        })
        .unwrap();
        assert_eq!(
            dev.alarm2().unwrap(),
            Alarm {
                day: Some(15),
                hour: Some(23),
                minute: Some(45),
                second: None,
            }
        );
        i2c.done();
    }

    #[test]
    fn test_alarms_do_not_overlap() {
        let mut chip = SimulatedChip::new();
        chip.registers = [0xEE; bus::REGISTER_COUNT];
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);
        dev.set_alarm2(&Alarm {
            day: None,
            hour: Some(12),
            minute: Some(1),
            second: Some(9),
        })
        .unwrap();
        let chip = dev.release();
        // alarm 1 day register and the control register are untouched
        assert_eq!(chip.registers[RegAddr::Alarm1DayDate as usize], 0xEE);
        assert_eq!(chip.registers[RegAddr::Control as usize], 0xEE);
        assert_eq!(
            &chip.registers[RegAddr::Alarm2Minutes as usize..=RegAddr::Alarm2DayDate as usize],
            &[0x01, 0x12, 0x00]
        );
    }

    #[test]
    fn test_temperature() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0x19, 0x00],
            ),
            // raw 0b0110010101
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0x65, 0x40],
            ),
            // -0.25 degrees
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0xFF, 0xC0],
            ),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        assert_eq!(dev.temperature().unwrap(), 25.0);
        assert_eq!(dev.temperature().unwrap(), 101.25);
        assert_eq!(dev.temperature().unwrap(), -0.25);
        i2c.done();
    }

    #[test]
    fn test_force_temperature_conversion_sequence() {
        let mut i2c = I2cMock::new(&[
            // a conversion is already running, then finishes
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x04],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x00],
            ),
            // start a conversion
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x3C]),
            // wait for the chip to clear CONV
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x3C]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0x19, 0x40],
            ),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        assert_eq!(dev.force_temperature_conversion().unwrap(), 25.25);
        i2c.done();
    }

    #[test]
    fn test_set_calibration_forces_conversion() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8, 0xF6]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x00],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x3C]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0x18, 0x80],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8], vec![0xF6]),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        assert_eq!(dev.set_calibration(-10).unwrap(), 24.5);
        assert_eq!(dev.calibration().unwrap(), -10);
        i2c.done();
    }

    #[test]
    fn test_calibration_through_chip() {
        let mut chip = SimulatedChip::new();
        chip.registers[RegAddr::MSBTemp as usize] = 0x15;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);

        for offset in [i8::MIN, -1, 0, 1, 42, i8::MAX] {
            assert_eq!(dev.set_calibration(offset).unwrap(), 21.0);
            assert_eq!(dev.calibration().unwrap(), offset);
        }
        assert!(!dev.control().unwrap().convert_temperature());
    }

    #[test]
    fn test_stuck_busy_bit_is_unresponsive() {
        let mut chip = SimulatedChip::new();
        chip.registers[RegAddr::ControlStatus as usize] = 0x04;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS).with_poll_limit(5);

        assert_eq!(
            dev.force_temperature_conversion(),
            Err(DS3231Error::Unresponsive)
        );
        let chip = dev.release();
        assert_eq!(chip.reads.len(), 5);
        assert!(chip.writes.is_empty());
    }

    #[test]
    fn test_stuck_conversion_is_unresponsive() {
        let mut chip = SimulatedChip::new();
        chip.completes_conversions = false;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS).with_poll_limit(3);

        assert_eq!(
            dev.force_temperature_conversion(),
            Err(DS3231Error::Unresponsive)
        );
        let chip = dev.release();
        // one busy poll, the read-modify-write, three conversion polls
        assert_eq!(chip.reads.len(), 5);
        assert_eq!(chip.writes, vec![(RegAddr::Control as u8, vec![0x20])]);
    }

    #[test]
    fn test_bus_error_is_propagated() {
        let mut i2c = I2cMock::new(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control as u8],
            vec![0x00],
        )
        .with_error(ErrorKind::Other)]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        assert_eq!(
            dev.set_alarm1_interrupt(true),
            Err(DS3231Error::Bus(ErrorKind::Other))
        );
        i2c.done();
    }

    #[test]
    fn test_wrong_address_is_a_bus_error() {
        let mut dev = DS3231::new(SimulatedChip::new(), 0x57);
        assert!(matches!(dev.datetime(), Err(DS3231Error::Bus(_))));
    }

    #[test]
    fn test_configure() {
        let config = Config {
            oscillator: Oscillator::Enabled,
            battery_backed_square_wave: true,
            square_wave_frequency: SquareWaveFrequency::Hz1,
            interrupt_control: InterruptControl::SquareWave,
        };
        let mut i2c = I2cMock::new(&[
            // power-on value with both alarm interrupts enabled
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1F]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x43]),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        dev.configure(&config).unwrap();
        i2c.done();
    }

    #[test]
    fn test_default_config_is_power_on_state() {
        let mut chip = SimulatedChip::new();
        chip.registers[RegAddr::Control as usize] = 0b1100_0011;
        let mut dev = DS3231::new(chip, DEFAULT_ADDRESS);
        dev.configure(&Config::default()).unwrap();
        assert_eq!(u8::from(dev.control().unwrap()), 0x1F);
    }

    #[test]
    fn test_status_snapshot() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x88],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x08]),
        ]);
        let mut dev = DS3231::new(i2c.clone(), DEVICE_ADDRESS);

        let mut status = dev.status().unwrap();
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        status.set_oscillator_stop_flag(false);
        dev.set_status(status).unwrap();
        i2c.done();
    }
}
