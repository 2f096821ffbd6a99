//! Register-file model of the DS3231 for tests.
//!
//! Answers I2C transactions at [`DEFAULT_ADDRESS`] from a plain register array
//! with an auto-incrementing register pointer, and records every read and
//! write so tests can check the exact bus traffic. With the `async` feature the
//! same model also serves the async driver.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::{bus::REGISTER_COUNT, registers, RegAddr, DEFAULT_ADDRESS};

pub(crate) struct SimulatedChip {
    pub registers: [u8; REGISTER_COUNT],
    /// Clear CONV as soon as it is set, as if the conversion finished instantly.
    pub completes_conversions: bool,
    /// (first register, length) of every read.
    pub reads: Vec<(u8, usize)>,
    /// (first register, data) of every write carrying data.
    pub writes: Vec<(u8, Vec<u8>)>,
    pointer: usize,
}

impl SimulatedChip {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            completes_conversions: true,
            reads: Vec::new(),
            writes: Vec::new(),
            pointer: 0,
        }
    }

    fn store(&mut self, data: &[u8]) {
        let control = RegAddr::Control as usize;
        let conv = registers::CONVERT_TEMPERATURE.byte_mask();
        let was_converting = self.registers[control] & conv != 0;
        for byte in data {
            self.registers[self.pointer % REGISTER_COUNT] = *byte;
            self.pointer += 1;
        }
        let started = !was_converting && self.registers[control] & conv != 0;
        if started && self.completes_conversions {
            self.registers[control] &= !conv;
        }
    }
}

impl ErrorType for SimulatedChip {
    type Error = ErrorKind;
}

impl I2c for SimulatedChip {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != DEFAULT_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    let Some((register, data)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = usize::from(*register);
                    if !data.is_empty() {
                        self.writes.push((*register, data.to_vec()));
                        self.store(data);
                    }
                }
                Operation::Read(buffer) => {
                    self.reads.push((self.pointer as u8, buffer.len()));
                    for byte in buffer.iter_mut() {
                        *byte = self.registers[self.pointer % REGISTER_COUNT];
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::i2c::I2c for SimulatedChip {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        I2c::transaction(self, address, operations)
    }
}
