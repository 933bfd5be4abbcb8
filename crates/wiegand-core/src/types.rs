use crate::{
    Result,
    constants::{CODE_FIELD, KEY_HASH, KEY_STAR, MAX_DIGIT, MAX_KEY_CODE},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two Wiegand data lines.
///
/// A falling edge on D0 appends a `0` bit, a falling edge on D1 appends a
/// `1` bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLine {
    /// D0, carries `0` bits.
    Zero,
    /// D1, carries `1` bits.
    One,
}

impl DataLine {
    /// Line that carries the given bit.
    #[must_use]
    pub fn for_bit(bit: bool) -> Self {
        if bit { DataLine::One } else { DataLine::Zero }
    }

    /// Bit appended by an edge on this line.
    #[must_use]
    pub fn bit(&self) -> bool {
        matches!(self, DataLine::One)
    }
}

impl fmt::Display for DataLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataLine::Zero => write!(f, "D0"),
            DataLine::One => write!(f, "D1"),
        }
    }
}

/// Decoding rule selected by the bit count of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WiegandFormat {
    /// 4-bit keypad key, no integrity check.
    Keypad4,
    /// 8-bit keypad key, high nibble is the complement of the low nibble.
    Keypad8,
    /// 26-bit card (or 24 bits sent without parity).
    Card26,
    /// 34-bit card (or 32 bits sent without parity).
    Card34,
}

impl WiegandFormat {
    /// Format for an accepted bit count, `None` for noise.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::WiegandFormat;
    ///
    /// assert_eq!(WiegandFormat::from_bit_count(8), Some(WiegandFormat::Keypad8));
    /// assert_eq!(WiegandFormat::from_bit_count(24), Some(WiegandFormat::Card26));
    /// assert_eq!(WiegandFormat::from_bit_count(7), None);
    /// ```
    #[must_use]
    pub fn from_bit_count(bit_count: u32) -> Option<Self> {
        match bit_count {
            4 => Some(WiegandFormat::Keypad4),
            8 => Some(WiegandFormat::Keypad8),
            24 | 26 => Some(WiegandFormat::Card26),
            32 | 34 => Some(WiegandFormat::Card34),
            _ => None,
        }
    }
}

impl fmt::Display for WiegandFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            WiegandFormat::Keypad4 => "keypad-4",
            WiegandFormat::Keypad8 => "keypad-8",
            WiegandFormat::Card26 => "card-26",
            WiegandFormat::Card34 => "card-34",
        };
        write!(f, "{}", name)
    }
}

/// A validated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedFrame {
    /// Decoded value: key code for keypad frames, card id for card frames.
    pub value: u32,

    /// Rule that produced the value.
    pub format: WiegandFormat,

    /// Number of bits actually received (24 and 32 are parity-less cards).
    pub bit_count: u32,
}

impl DecodedFrame {
    pub fn new(value: u32, format: WiegandFormat, bit_count: u32) -> Self {
        Self {
            value,
            format,
            bit_count,
        }
    }

    /// Keypad interpretation of the decoded value.
    #[must_use]
    pub fn key_input(&self) -> KeyInput {
        KeyInput::from_code(self.value)
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({} bits): {}", self.format, self.bit_count, self.value)
    }
}

/// Why accumulated bits were thrown away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscardReason {
    /// Bit count is not one of the accepted frame widths.
    UnsupportedLength { bit_count: u32 },

    /// 8-bit keypad frame whose high nibble is not the complement of the low
    /// nibble.
    ParityMismatch { high_nibble: u8, low_nibble: u8 },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DiscardReason::UnsupportedLength { bit_count } => {
                write!(f, "unsupported frame length: {} bits", bit_count)
            }
            DiscardReason::ParityMismatch {
                high_nibble,
                low_nibble,
            } => write!(
                f,
                "keypad parity mismatch: high nibble {:04b}, low nibble {:04b}",
                high_nibble, low_nibble
            ),
        }
    }
}

/// Keypad meaning of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (`*`), clears the pending code and sends `*`.
    Star,

    /// Hash key (`#`), sends the pending code.
    Hash,

    /// Any other value (unused keypad codes, card ids).
    Other(u32),
}

impl KeyInput {
    /// Interpret a decoded value.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::KeyInput;
    ///
    /// assert_eq!(KeyInput::from_code(7), KeyInput::Digit(7));
    /// assert_eq!(KeyInput::from_code(10), KeyInput::Star);
    /// assert_eq!(KeyInput::from_code(11), KeyInput::Hash);
    /// assert_eq!(KeyInput::from_code(4_660), KeyInput::Other(4_660));
    /// ```
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            0..=MAX_DIGIT => KeyInput::Digit(code as u8),
            KEY_STAR => KeyInput::Star,
            KEY_HASH => KeyInput::Hash,
            other => KeyInput::Other(other),
        }
    }

    /// Value a keypad sends for this key.
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            KeyInput::Digit(d) => u32::from(*d),
            KeyInput::Star => KEY_STAR,
            KeyInput::Hash => KEY_HASH,
            KeyInput::Other(value) => *value,
        }
    }

    /// ASCII character for digit keys.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            KeyInput::Digit(d) => char::from_digit(u32::from(*d), 10),
            KeyInput::Star => Some('*'),
            KeyInput::Hash => Some('#'),
            KeyInput::Other(_) => None,
        }
    }
}

impl std::str::FromStr for KeyInput {
    type Err = Error;

    /// Parse a key label: `0`-`9`, `*`, `#`, or a raw keypad code `12`-`15`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "*" => Ok(KeyInput::Star),
            "#" => Ok(KeyInput::Hash),
            other => {
                let code: u32 = other
                    .parse()
                    .map_err(|_| Error::InvalidKeySymbol(other.to_string()))?;
                if code > MAX_KEY_CODE {
                    return Err(Error::InvalidKey(code));
                }
                Ok(KeyInput::from_code(code))
            }
        }
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_char() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "<{}>", self.code()),
        }
    }
}

/// Payload of a service call: a single `code` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePayload {
    pub code: String,
}

/// External action invocation carrying an entered code.
///
/// Serializes to the shape home-automation services expect:
///
/// ```
/// use wiegand_core::ServiceCall;
///
/// let call = ServiceCall::new("esphome.door_code", "1234");
/// assert_eq!(call.code(), "1234");
/// assert_eq!(call.field("code"), Some("1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCall {
    /// Configured service identifier.
    pub service: String,

    /// Payload with the entered code.
    pub data: CodePayload,
}

impl ServiceCall {
    pub fn new(service: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            data: CodePayload { code: code.into() },
        }
    }

    /// The entered code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.data.code
    }

    /// Look up a payload field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        (name == CODE_FIELD).then_some(self.data.code.as_str())
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({}={:?})", self.service, CODE_FIELD, self.data.code)
    }
}
