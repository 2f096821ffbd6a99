//! Bit-field descriptors.
//!
//! A [`Field`] names a run of bits inside one or more consecutive registers.
//! The descriptor itself does no I/O: [`Field::extract`] and [`Field::insert`]
//! operate on the bytes read from the device, and the driver performs the
//! surrounding read-modify-write on the bus.

use crate::registers::RegAddr;

/// Order in which the bytes of a multi-byte field are combined.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// First register holds the least significant byte.
    LsbFirst,
    /// First register holds the most significant byte.
    MsbFirst,
}

/// Location and interpretation of a bit field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// First register covered by the field.
    pub register: RegAddr,
    /// Position of the field's lowest bit, counted from bit 0 of the combined value.
    pub offset: u8,
    /// Number of bits (1-32).
    pub width: u8,
    /// How the covered registers combine into one value.
    pub order: ByteOrder,
    /// Whether the field holds a two's-complement value.
    pub signed: bool,
}

impl Field {
    /// A single-bit flag.
    #[must_use]
    pub const fn flag(register: RegAddr, bit: u8) -> Self {
        Self::bits(register, bit, 1)
    }

    /// An unsigned field of `width` bits starting at `offset`.
    #[must_use]
    pub const fn bits(register: RegAddr, offset: u8, width: u8) -> Self {
        Self {
            register,
            offset,
            width,
            order: ByteOrder::LsbFirst,
            signed: false,
        }
    }

    /// A two's-complement field of `width` bits starting at `offset`.
    #[must_use]
    pub const fn signed(register: RegAddr, offset: u8, width: u8) -> Self {
        Self {
            register,
            offset,
            width,
            order: ByteOrder::LsbFirst,
            signed: true,
        }
    }

    /// The same field with the first register as most significant byte.
    #[must_use]
    pub const fn msb_first(self) -> Self {
        Self {
            order: ByteOrder::MsbFirst,
            ..self
        }
    }

    /// Number of registers the field touches.
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.offset as usize + self.width as usize).div_ceil(8)
    }

    /// Mask of the field bits within the combined register value.
    #[must_use]
    pub const fn mask(&self) -> u32 {
        let ones = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        ones << self.offset
    }

    /// Mask of a single-register field as a byte.
    ///
    /// Only meaningful for fields that fit in their first register.
    #[must_use]
    pub const fn byte_mask(&self) -> u8 {
        (self.mask() & 0xFF) as u8
    }

    fn combine(&self, bytes: &[u8]) -> u32 {
        let bytes = &bytes[..self.len()];
        match self.order {
            ByteOrder::LsbFirst => bytes
                .iter()
                .rev()
                .fold(0, |acc, b| (acc << 8) | u32::from(*b)),
            ByteOrder::MsbFirst => bytes.iter().fold(0, |acc, b| (acc << 8) | u32::from(*b)),
        }
    }

    fn split(&self, raw: u32, bytes: &mut [u8]) {
        let len = self.len();
        for (i, byte) in bytes[..len].iter_mut().enumerate() {
            let shift = match self.order {
                ByteOrder::LsbFirst => 8 * i,
                ByteOrder::MsbFirst => 8 * (len - 1 - i),
            };
            *byte = (raw >> shift) as u8;
        }
    }

    /// Extracts the field value from the registers it covers.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`Field::len`].
    #[must_use]
    pub fn extract(&self, bytes: &[u8]) -> i32 {
        let raw = (self.combine(bytes) & self.mask()) >> self.offset;
        if self.signed && self.width < 32 {
            // sign-extend by moving the field's top bit to bit 31 and back
            let unused = 32 - u32::from(self.width);
            ((raw << unused) as i32) >> unused
        } else {
            raw as i32
        }
    }

    /// Replaces the field bits in `bytes` with `value`, leaving every other bit untouched.
    ///
    /// Bits of `value` beyond the field width are dropped.
    ///
    /// # Panics
    /// Panics if `bytes` is shorter than [`Field::len`].
    pub fn insert(&self, bytes: &mut [u8], value: i32) {
        let mask = self.mask();
        let raw = (self.combine(bytes) & !mask) | (((value as u32) << self.offset) & mask);
        self.split(raw, bytes);
    }
}
