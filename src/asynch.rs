//! Async implementation of the DS3231 driver.
//!
//! This module provides an async interface to the DS3231 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. Every operation issues the same register transactions as its
//! blocking counterpart in the crate root.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::asynch::DS3231;
//!
//! let mut rtc = DS3231::new(i2c, 0x68);
//! let datetime = rtc.datetime().await?;
//! let celsius = rtc.force_temperature_conversion().await?;
//! ```

use paste::paste;

use crate::{
    alarm::MAX_ALARM_LEN, datetime::DATETIME_LEN, registers, Alarm, AlarmSlot, AsyncRegisterBus,
    Config, Control, DS3231Error, DateTime, Field, RegAddr, Status, DEFAULT_POLL_LIMIT,
    MAX_FIELD_LEN,
};

/// DS3231 Real-Time Clock async driver.
pub struct DS3231<B> {
    bus: B,
    address: u8,
    poll_limit: u32,
}

impl<B: AsyncRegisterBus> DS3231<B> {
    /// Creates a new DS3231 async driver instance.
    ///
    /// # Arguments
    /// * `bus` - The async bus the chip is attached to
    /// * `address` - The I2C address of the device (typically 0x68)
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

    async fn read(
        &mut self,
        register: RegAddr,
        buffer: &mut [u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        trace!("DS3231: read {:?} len={}", register, buffer.len());
        let address = self.address;
        self.bus
            .read_register(address, register as u8, buffer)
            .await?;
        Ok(())
    }

    async fn write(
        &mut self,
        register: RegAddr,
        data: &[u8],
    ) -> Result<(), DS3231Error<B::Error>> {
        trace!("DS3231: write {:?} {:?}", register, data);
        let address = self.address;
        self.bus
            .write_register(address, register as u8, data)
            .await?;
        Ok(())
    }

    /// Reads a bit field.
    pub async fn read_bits(&mut self, field: Field) -> Result<i32, DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_FIELD_LEN];
        let data = &mut data[..field.len()];
        self.read(field.register, data).await?;
        Ok(field.extract(data))
    }

    /// Writes a bit field with one read and one write of the registers it covers.
    pub async fn write_bits(
        &mut self,
        field: Field,
        value: i32,
    ) -> Result<(), DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_FIELD_LEN];
        let data = &mut data[..field.len()];
        self.read(field.register, data).await?;
        field.insert(data, value);
        self.write(field.register, data).await
    }

    /// Returns whether any bit of `mask` is set in `register`.
    pub async fn read_bit(
        &mut self,
        register: RegAddr,
        mask: u8,
    ) -> Result<bool, DS3231Error<B::Error>> {
        let mut data = [0u8];
        self.read(register, &mut data).await?;
        Ok(data[0] & mask != 0)
    }

    /// Sets or clears the bits of `mask` in `register`, preserving all other bits.
    pub async fn write_bit(
        &mut self,
        register: RegAddr,
        mask: u8,
        value: bool,
    ) -> Result<(), DS3231Error<B::Error>> {
        let mut data = [0u8];
        self.read(register, &mut data).await?;
        if value {
            data[0] |= mask;
        } else {
            data[0] &= !mask;
        }
        self.write(register, &data).await
    }

    /// Gets the current date and time from the device.
    pub async fn datetime(&mut self) -> Result<DateTime, DS3231Error<B::Error>> {
        let mut data = [0u8; DATETIME_LEN];
        self.read(RegAddr::Seconds, &mut data).await?;
        let datetime = DateTime::from_registers(&data);
        debug!("DS3231: datetime {:?}", datetime);
        Ok(datetime)
    }

    /// Sets the date and time, then re-enables the oscillator and clears the
    /// oscillator stop flag.
    pub async fn set_datetime(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: set datetime {:?}", datetime);
        let data = datetime.to_registers();
        self.write(RegAddr::Seconds, &data).await?;
        self.set_oscillator_disabled(false).await?;
        self.clear_lost_power().await
    }

    /// Returns true if the oscillator stopped since the flag was last cleared.
    pub async fn lost_power(&mut self) -> Result<bool, DS3231Error<B::Error>> {
        let field = registers::OSCILLATOR_STOP_FLAG;
        self.read_bit(field.register, field.byte_mask()).await
    }

    /// Clears the oscillator stop flag.
    pub async fn clear_lost_power(&mut self) -> Result<(), DS3231Error<B::Error>> {
        let field = registers::OSCILLATOR_STOP_FLAG;
        self.write_bit(field.register, field.byte_mask(), false)
            .await
    }

    /// Reads an alarm.
    pub async fn alarm(&mut self, slot: AlarmSlot) -> Result<Alarm, DS3231Error<B::Error>> {
        let mut data = [0u8; MAX_ALARM_LEN];
        let data = &mut data[..slot.len()];
        self.read(slot.register(), data).await?;
        let alarm = Alarm::from_registers(slot, data);
        debug!("DS3231: {:?} {:?}", slot, alarm);
        Ok(alarm)
    }

    /// Writes an alarm in one transaction. Absent fields are written as zero.
    pub async fn set_alarm(
        &mut self,
        slot: AlarmSlot,
        alarm: &Alarm,
    ) -> Result<(), DS3231Error<B::Error>> {
        debug!("DS3231: set {:?} {:?}", slot, alarm);
        let (data, len) = alarm.to_registers(slot);
        self.write(slot.register(), &data[..len]).await
    }

    /// Reads alarm 1.
    pub async fn alarm1(&mut self) -> Result<Alarm, DS3231Error<B::Error>> {
        self.alarm(AlarmSlot::One).await
    }

    /// Writes alarm 1.
    pub async fn set_alarm1(&mut self, alarm: &Alarm) -> Result<(), DS3231Error<B::Error>> {
        self.set_alarm(AlarmSlot::One, alarm).await
    }

    /// Reads alarm 2 (`second` is always `None`).
    pub async fn alarm2(&mut self) -> Result<Alarm, DS3231Error<B::Error>> {
        self.alarm(AlarmSlot::Two).await
    }

    /// Writes alarm 2; `second` is ignored.
    pub async fn set_alarm2(&mut self, alarm: &Alarm) -> Result<(), DS3231Error<B::Error>> {
        self.set_alarm(AlarmSlot::Two, alarm).await
    }

    /// Reads the aging offset.
    pub async fn calibration(&mut self) -> Result<i8, DS3231Error<B::Error>> {
        Ok(self.read_bits(registers::AGING_OFFSET).await? as i8)
    }

    /// Writes the aging offset, then forces a temperature conversion.
    /// Returns the new temperature.
    pub async fn set_calibration(&mut self, offset: i8) -> Result<f32, DS3231Error<B::Error>> {
        debug!("DS3231: set aging offset {}", offset);
        self.write_bits(registers::AGING_OFFSET, i32::from(offset))
            .await?;
        self.force_temperature_conversion().await
    }

    /// Reads the last converted temperature in degrees Celsius.
    pub async fn temperature(&mut self) -> Result<f32, DS3231Error<B::Error>> {
        let raw = self.read_bits(registers::TEMPERATURE).await?;
        Ok(raw as f32 / 4.0)
    }

    /// Runs a temperature conversion and returns the new temperature.
    ///
    /// # Errors
    /// Returns [`DS3231Error::Unresponsive`] if either wait exceeds the poll limit.
    pub async fn force_temperature_conversion(&mut self) -> Result<f32, DS3231Error<B::Error>> {
        let convert = registers::CONVERT_TEMPERATURE;
        self.wait_while(registers::BUSY).await?;
        self.write_bit(convert.register, convert.byte_mask(), true)
            .await?;
        self.wait_while(convert).await?;
        let temperature = self.temperature().await?;
        debug!("DS3231: temperature {}", temperature);
        Ok(temperature)
    }

    async fn wait_while(&mut self, field: Field) -> Result<(), DS3231Error<B::Error>> {
        for _ in 0..self.poll_limit {
            if !self.read_bit(field.register, field.byte_mask()).await? {
                return Ok(());
            }
        }
        error!("DS3231: {:?} stuck after {} polls", field, self.poll_limit);
        Err(DS3231Error::Unresponsive)
    }

    /// Applies the configuration with one read-modify-write of the control register.
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<B::Error>> {
        let mut control = self.control().await?;
        control.set_oscillator(config.oscillator);
        control.set_battery_backed_square_wave(config.battery_backed_square_wave);
        control.set_square_wave_frequency(config.square_wave_frequency);
        control.set_interrupt_control(config.interrupt_control);
        debug!("DS3231: writing control: {:?}", control);
        self.set_control(control).await
    }
}

// Whole-register access with the typed register views
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<B: AsyncRegisterBus> DS3231<B> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<B::Error>> {
                        let mut data = [0];
                        self.read($regaddr, &mut data).await?;
                        Ok(<$typ>::from(data[0]))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](
                        &mut self,
                        value: $typ,
                    ) -> Result<(), DS3231Error<B::Error>> {
                        self.write($regaddr, &[value.into()]).await
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

// Named single-bit properties, see the blocking driver
macro_rules! impl_flag_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<B: AsyncRegisterBus> DS3231<B> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " flag.")]
                    pub async fn $name(&mut self) -> Result<bool, DS3231Error<B::Error>> {
                        let field: Field = $field;
                        self.read_bit(field.register, field.byte_mask()).await
                    }

                    #[doc = concat!("Writes the ", stringify!($name), " flag.")]
                    pub async fn [<set_ $name>](
                        &mut self,
                        value: bool,
                    ) -> Result<(), DS3231Error<B::Error>> {
                        let field: Field = $field;
                        self.write_bit(field.register, field.byte_mask(), value)
                            .await
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
