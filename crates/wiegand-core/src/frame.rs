//! Synthetic Wiegand frame encoder.
//!
//! Builds the bit sequences a keypad or card reader puts on the wire, most
//! significant bit first, with the parity bits each format carries. Used by
//! the mock lines, tests and benches to drive the decoder without hardware.
//!
//! # Examples
//!
//! ```
//! use wiegand_core::{DataLine, KeyInput, WiegandFrame};
//!
//! // Key "1" on an 8-bit keypad: 1110 0001
//! let frame = WiegandFrame::keypad8(KeyInput::Digit(1)).unwrap();
//! assert_eq!(frame.to_string(), "11100001");
//!
//! let lines: Vec<DataLine> = frame.lines().collect();
//! assert_eq!(lines[0], DataLine::One);
//! assert_eq!(lines[3], DataLine::Zero);
//! ```

use crate::{
    DataLine, KeyInput, Result,
    constants::{CARD26_DATA_BITS, CARD34_DATA_BITS, MAX_KEY_CODE, NIBBLE_MASK},
    error::Error,
};
use std::fmt;

/// Ordered bits of one Wiegand frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WiegandFrame {
    bits: Vec<bool>,
}

impl WiegandFrame {
    /// Frame from raw bits, sent as-is.
    pub fn raw(bits: impl Into<Vec<bool>>) -> Self {
        Self { bits: bits.into() }
    }

    /// 4-bit keypad frame: the key code as a single nibble.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key code does not fit in a nibble.
    pub fn keypad4(key: KeyInput) -> Result<Self> {
        let code = Self::key_code(key)?;
        Ok(Self::from_value(code, 4))
    }

    /// 8-bit keypad frame: complemented key code in the high nibble, key
    /// code in the low nibble.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the key code does not fit in a nibble.
    pub fn keypad8(key: KeyInput) -> Result<Self> {
        let code = Self::key_code(key)?;
        let byte = ((!code & NIBBLE_MASK) << 4) | code;
        Ok(Self::from_value(byte, 8))
    }

    /// 26-bit card frame.
    ///
    /// Layout: even parity over the first 12 data bits, 24 data bits, odd
    /// parity over the last 12 data bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCardId`] if the id needs more than 24 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::WiegandFrame;
    ///
    /// let frame = WiegandFrame::card26(0x00AB_CDEF).unwrap();
    /// assert_eq!(frame.len(), 26);
    /// assert!(WiegandFrame::card26(0x0100_0000).is_err());
    /// ```
    pub fn card26(id: u32) -> Result<Self> {
        Self::card(u64::from(id), CARD26_DATA_BITS)
    }

    /// 34-bit card frame.
    ///
    /// Layout: even parity over the first 16 data bits, 32 data bits, odd
    /// parity over the last 16 data bits. Every `u32` id fits.
    pub fn card34(id: u32) -> Self {
        Self::card_bits(u64::from(id), CARD34_DATA_BITS)
    }

    /// Parse a string of `0` and `1` characters. Whitespace and `_` are
    /// ignored so long frames can be grouped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBits`] on any other character or an empty
    /// sequence.
    pub fn from_bit_str(s: &str) -> Result<Self> {
        let mut bits = Vec::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                '_' => {}
                c if c.is_whitespace() => {}
                other => {
                    return Err(Error::InvalidBits(format!(
                        "unexpected character {:?} in {:?}",
                        other, s
                    )));
                }
            }
        }
        if bits.is_empty() {
            return Err(Error::InvalidBits("empty bit sequence".to_string()));
        }
        Ok(Self { bits })
    }

    /// The bits, first transmitted first.
    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of bits (one edge per bit).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Line pulsed for each bit, in transmission order.
    pub fn lines(&self) -> impl Iterator<Item = DataLine> + '_ {
        self.bits.iter().map(|&bit| DataLine::for_bit(bit))
    }

    fn key_code(key: KeyInput) -> Result<u32> {
        let code = key.code();
        if code > MAX_KEY_CODE {
            return Err(Error::InvalidKey(code));
        }
        Ok(code)
    }

    fn card(id: u64, data_bits: u8) -> Result<Self> {
        if id >> data_bits != 0 {
            return Err(Error::InvalidCardId {
                id,
                bits: data_bits,
            });
        }
        Ok(Self::card_bits(id, data_bits))
    }

    fn card_bits(id: u64, data_bits: u8) -> Self {
        let data: Vec<bool> = (0..data_bits)
            .rev()
            .map(|shift| (id >> shift) & 1 == 1)
            .collect();
        let (first_half, second_half) = data.split_at(data.len() / 2);

        let leading = Self::ones(first_half) % 2 == 1; // even parity
        let trailing = Self::ones(second_half) % 2 == 0; // odd parity

        let mut bits = Vec::with_capacity(data.len() + 2);
        bits.push(leading);
        bits.extend_from_slice(&data);
        bits.push(trailing);
        Self { bits }
    }

    fn from_value(value: u32, width: u32) -> Self {
        let bits = (0..width).rev().map(|shift| (value >> shift) & 1 == 1).collect();
        Self { bits }
    }

    fn ones(bits: &[bool]) -> usize {
        bits.iter().filter(|&&bit| bit).count()
    }
}

impl fmt::Display for WiegandFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", if *bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl std::str::FromStr for WiegandFrame {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bit_str(s)
    }
}
