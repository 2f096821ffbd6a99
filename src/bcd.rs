//! Packed binary-coded decimal helpers.
//!
//! Every time and alarm register of the DS3231 stores its value as two
//! decimal digits, tens in the high nibble and units in the low nibble.
//! Neither direction validates its input: a nibble above 9 decodes to a
//! numerically wrong value and an input above 99 encodes to a malformed byte.

/// Decodes a packed BCD byte into its binary value.
#[must_use]
pub const fn decode(value: u8) -> u8 {
    10 * (value >> 4) + (value & 0x0F)
}

/// Encodes a binary value (0-99) as a packed BCD byte.
#[must_use]
pub const fn encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
