//! Register-level bus access.
//!
//! The driver never talks to an I2C peripheral directly; it only needs to read
//! and write runs of consecutive registers at a device address. Any
//! `embedded-hal` I2C bus provides that through the blanket implementations
//! below, and tests or exotic transports can implement the traits themselves.

/// Number of addressable registers in the DS3231 (0x00-0x12).
pub const REGISTER_COUNT: usize = 0x13;

/// Blocking access to a run of device registers.
pub trait RegisterBus {
    /// Transport error.
    type Error;

    /// Fills `buffer` with the registers starting at `register`.
    ///
    /// # Errors
    /// Returns the transport error if the bus transaction fails.
    fn read_register(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Writes `data` to the registers starting at `register` in one transaction.
    ///
    /// # Errors
    /// Returns the transport error if the bus transaction fails.
    fn write_register(&mut self, address: u8, register: u8, data: &[u8])
        -> Result<(), Self::Error>;
}

impl<I2C: embedded_hal::i2c::I2c> RegisterBus for I2C {
    type Error = I2C::Error;

    fn read_register(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[register], buffer)
    }

    /// # Panics
    /// Panics if `data` is longer than the register map.
    fn write_register(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut frame = [0u8; REGISTER_COUNT + 1];
        frame[0] = register;
        frame[1..=data.len()].copy_from_slice(data);
        self.write(address, &frame[..=data.len()])
    }
}

/// Async access to a run of device registers.
#[cfg(feature = "async")]
#[allow(async_fn_in_trait)]
pub trait AsyncRegisterBus {
    /// Transport error.
    type Error;

    /// Fills `buffer` with the registers starting at `register`.
    ///
    /// # Errors
    /// Returns the transport error if the bus transaction fails.
    async fn read_register(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Writes `data` to the registers starting at `register` in one transaction.
    ///
    /// # Errors
    /// Returns the transport error if the bus transaction fails.
    async fn write_register(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> Result<(), Self::Error>;
}

#[cfg(feature = "async")]
impl<I2C: embedded_hal_async::i2c::I2c> AsyncRegisterBus for I2C {
    type Error = I2C::Error;

    async fn read_register(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[register], buffer).await
    }

    async fn write_register(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut frame = [0u8; REGISTER_COUNT + 1];
        frame[0] = register;
        frame[1..=data.len()].copy_from_slice(data);
        self.write(address, &frame[..=data.len()]).await
    }
}
