//! Frame classification.
//!
//! Once per polling cycle the classifier looks at the accumulated bits. A
//! frame is complete when the data lines have been quiet for longer than
//! [`SILENCE_THRESHOLD_MS`]; its bit count then selects the decoding rule.
//!
//! | bits | format | value |
//! |------|--------|-------|
//! | 4 | keypad | low nibble |
//! | 8 | keypad | low nibble, if the high nibble is its complement |
//! | 24 | card | low word |
//! | 26 | card | 24 data bits between the parity bits |
//! | 32 | card | low word |
//! | 34 | card | 32 data bits between the parity bits |
//!
//! Anything else is noise and is dropped.

use serde::{Deserialize, Serialize};
use tracing::trace;
use wiegand_core::constants::{
    CARD26_DATA_MASK, CARD34_HIGH_MASK, HIGH_NIBBLE_MASK, HIGH_WORD_SHIFT_THRESHOLD, NIBBLE_MASK,
    SILENCE_THRESHOLD_MS,
};
use wiegand_core::{DecodedFrame, DiscardReason, WiegandFormat};

use crate::accumulator::RawBits;

/// Result of one classification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Edges arrived too recently; the frame may still be in progress.
    Pending,

    /// Silence with nothing accumulated.
    Idle,

    /// A complete, valid frame.
    Frame(DecodedFrame),

    /// Bits were received but did not form a valid frame.
    Discarded(DiscardReason),
}

impl Classification {
    /// The decoded frame, if any.
    #[must_use]
    pub fn frame(&self) -> Option<&DecodedFrame> {
        match self {
            Classification::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_frame(&self) -> bool {
        matches!(self, Classification::Frame(_))
    }
}

/// Turns accumulated bits into frames.
///
/// Remembers the format of the last accepted-length frame, valid or not.
///
/// # Examples
///
/// ```
/// use wiegand_core::{KeyInput, WiegandFormat, WiegandFrame};
/// use wiegand_reader::{Classification, FrameClassifier, RawBits};
///
/// let mut bits = RawBits::new();
/// for line in WiegandFrame::keypad8(KeyInput::Digit(7))?.lines() {
///     bits.push(line, 100);
/// }
///
/// let mut classifier = FrameClassifier::new();
///
/// // quiet for only 10 ms: still waiting
/// assert_eq!(classifier.classify(&mut bits, 110), Classification::Pending);
///
/// let result = classifier.classify(&mut bits, 130);
/// let frame = result.frame().unwrap();
/// assert_eq!(frame.value, 7);
/// assert_eq!(frame.format, WiegandFormat::Keypad8);
/// assert!(bits.is_empty());
/// # Ok::<(), wiegand_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameClassifier {
    last_format: Option<WiegandFormat>,
}

impl FrameClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format of the most recent frame with an accepted bit count.
    #[must_use]
    pub fn last_format(&self) -> Option<WiegandFormat> {
        self.last_format
    }

    /// Classify and, unless the frame is still in progress, reset `bits`.
    ///
    /// The caller must hold the bus lock for the duration of the call so no
    /// edge lands between extraction and reset.
    pub fn classify(&mut self, bits: &mut RawBits, now_ms: u64) -> Classification {
        let elapsed = now_ms.saturating_sub(bits.last_edge_ms);
        if elapsed <= SILENCE_THRESHOLD_MS {
            return Classification::Pending;
        }

        let bit_count = bits.bit_count;
        let Some(format) = WiegandFormat::from_bit_count(bit_count) else {
            bits.reset();
            bits.last_edge_ms = now_ms;
            if bit_count == 0 {
                return Classification::Idle;
            }
            trace!(bit_count, "Dropping noise");
            return Classification::Discarded(DiscardReason::UnsupportedLength { bit_count });
        };

        // Undo the shift applied after the last bit.
        bits.low >>= 1;
        if bit_count > HIGH_WORD_SHIFT_THRESHOLD {
            bits.high >>= 1;
        }
        self.last_format = Some(format);

        let value = match format {
            WiegandFormat::Keypad8 => {
                let high_nibble = (bits.low & HIGH_NIBBLE_MASK) >> 4;
                let low_nibble = bits.low & NIBBLE_MASK;
                bits.reset();

                if low_nibble != (!high_nibble & NIBBLE_MASK) {
                    bits.last_edge_ms = now_ms;
                    return Classification::Discarded(DiscardReason::ParityMismatch {
                        high_nibble: high_nibble as u8,
                        low_nibble: low_nibble as u8,
                    });
                }
                low_nibble
            }
            WiegandFormat::Keypad4 => {
                let value = bits.low & NIBBLE_MASK;
                bits.reset();
                value
            }
            WiegandFormat::Card26 | WiegandFormat::Card34 => {
                let value = card_value(bits, bit_count);
                bits.reset();
                value
            }
        };

        Classification::Frame(DecodedFrame::new(value, format, bit_count))
    }
}

/// Card id from compensated accumulator words.
fn card_value(bits: &RawBits, bit_count: u32) -> u32 {
    match bit_count {
        26 => (bits.low & CARD26_DATA_MASK) >> 1,
        34 => ((bits.high & CARD34_HIGH_MASK) << 30) | (bits.low >> 1),
        // 24 and 32 bit readers send the id without parity
        _ => bits.low,
    }
}
