//! Core constants for the Wiegand keypad reader.
//!
//! Timing thresholds, accepted frame widths, bit masks and key codes used by
//! the decoder. The numeric values are fixed by the devices on the wire:
//! keypads and card readers that speak Wiegand expect a reader with exactly
//! this behavior, so none of them is runtime-configurable except the polling
//! cadence.
//!
//! # Frame Layout
//!
//! A Wiegand frame is a burst of falling-edge pulses. A pulse on D0 is a `0`
//! bit, a pulse on D1 is a `1` bit, most significant bit first. The frame
//! ends when the lines stay quiet for longer than [`SILENCE_THRESHOLD_MS`].
//!
//! ```text
//! 26-bit card:   P DDDDDDDDDDDDDDDDDDDDDDDD P
//!                ^ even parity              ^ odd parity
//!
//! 8-bit keypad:  ~K ~K ~K ~K  K  K  K  K
//!                high nibble = complement of the key code
//! ```
//!
//! # Usage
//!
//! ```
//! use wiegand_core::constants::*;
//!
//! fn frame_complete(elapsed_ms: u64) -> bool {
//!     elapsed_ms > SILENCE_THRESHOLD_MS
//! }
//!
//! assert!(!frame_complete(25));
//! assert!(frame_complete(26));
//! assert!(ACCEPTED_BIT_COUNTS.contains(&26));
//! ```

// ============================================================================
// Timing
// ============================================================================

/// Silence after the last edge before the accumulated bits count as a frame.
///
/// The comparison is strict: a frame is complete once more than this many
/// milliseconds elapsed since the last edge.
pub const SILENCE_THRESHOLD_MS: u64 = 25;

/// Inter-digit idle timeout in milliseconds.
///
/// A pending key sequence is sent without a terminator once more than this
/// many milliseconds pass without a new frame.
pub const IDLE_TIMEOUT_MS: u64 = 2_000;

/// Default polling cadence of the frame classifier in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 200;

// ============================================================================
// Frame Widths
// ============================================================================

/// Bit counts accepted as a frame.
///
/// - `4`: keypad key, no integrity check
/// - `8`: keypad key, high nibble is the complement of the low nibble
/// - `24`, `26`: 26-bit card family (24 = sent without parity bits)
/// - `32`, `34`: 34-bit card family (32 = sent without parity bits)
///
/// Anything else is noise.
pub const ACCEPTED_BIT_COUNTS: [u32; 6] = [4, 8, 24, 26, 32, 34];

/// Bit count above which every new bit spills the top of the low word into
/// the high word.
pub const HIGH_WORD_THRESHOLD: u32 = 31;

/// Bit count above which the high word also needs the compensating right
/// shift when a frame is classified.
pub const HIGH_WORD_SHIFT_THRESHOLD: u32 = 32;

// ============================================================================
// Bit Masks
// ============================================================================

/// Top bit of the low word, carried into the high word on overflow.
pub const LOW_WORD_TOP_BIT: u32 = 0x8000_0000;

/// Low nibble of a keypad frame.
pub const NIBBLE_MASK: u32 = 0x0F;

/// High nibble of an 8-bit keypad frame.
pub const HIGH_NIBBLE_MASK: u32 = 0xF0;

/// Data bits of a 26-bit frame once the compensating shift is applied
/// (bits 1..=24, dropping both parity bits).
pub const CARD26_DATA_MASK: u32 = 0x01FF_FFFE;

/// Bits of the high word that belong to a 34-bit card value.
pub const CARD34_HIGH_MASK: u32 = 0b11;

/// Number of data bits carried by a 26-bit card frame.
pub const CARD26_DATA_BITS: u8 = 24;

/// Number of data bits carried by a 34-bit card frame.
pub const CARD34_DATA_BITS: u8 = 32;

// ============================================================================
// Key Codes
// ============================================================================

/// Highest key code that is a digit.
pub const MAX_DIGIT: u32 = 9;

/// Key code of the `*` key (clear and send).
pub const KEY_STAR: u32 = 10;

/// Key code of the `#` key (terminator).
pub const KEY_HASH: u32 = 11;

/// Highest key code a keypad frame can carry (one nibble).
pub const MAX_KEY_CODE: u32 = 15;

// ============================================================================
// Service Call
// ============================================================================

/// Name of the single payload field of a service call.
pub const CODE_FIELD: &str = "code";

/// Payload sent when the `*` key is pressed.
pub const STAR_CODE: &str = "*";

/// Service invoked when none is configured.
pub const DEFAULT_SERVICE: &str = "esphome.wiegand_code";

/// Default GPIO pin of the D0 line.
pub const DEFAULT_D0_PIN: u8 = 4;

/// Default GPIO pin of the D1 line.
pub const DEFAULT_D1_PIN: u8 = 5;

/// Default capacity of the reader event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 100;
