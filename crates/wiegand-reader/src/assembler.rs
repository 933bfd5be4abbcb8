//! Key sequence assembly.
//!
//! Digits collect into a pending code. `#` sends it, `*` throws it away and
//! sends `*` instead, and a pending code that sits untouched for
//! [`IDLE_TIMEOUT_MS`] is sent as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use wiegand_core::KeyInput;
use wiegand_core::constants::{IDLE_TIMEOUT_MS, STAR_CODE};

/// What caused a code to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushTrigger {
    /// `#` pressed.
    Terminator,
    /// `*` pressed.
    Clear,
    /// No input for longer than the idle timeout.
    IdleTimeout,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FlushTrigger::Terminator => write!(f, "terminator"),
            FlushTrigger::Clear => write!(f, "clear"),
            FlushTrigger::IdleTimeout => write!(f, "idle timeout"),
        }
    }
}

/// Accumulates keypad digits into a code.
///
/// # Examples
///
/// ```
/// use wiegand_reader::KeyAssembler;
///
/// let mut assembler = KeyAssembler::new();
/// assert_eq!(assembler.on_frame(1, 0), None);
/// assert_eq!(assembler.on_frame(2, 400), None);
/// assert_eq!(assembler.on_frame(11, 800), Some("12".to_string()));
/// assert!(assembler.pending().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct KeyAssembler {
    pending: String,
    last_activity_ms: u64,
    idle_timeout_ms: u64,
}

impl Default for KeyAssembler {
    fn default() -> Self {
        Self::with_idle_timeout(IDLE_TIMEOUT_MS)
    }
}

impl KeyAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout_ms: u64) -> Self {
        Self {
            pending: String::new(),
            last_activity_ms: 0,
            idle_timeout_ms,
        }
    }

    /// Digits entered since the last flush.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Time of the last decoded frame.
    #[must_use]
    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Handle a decoded value. Returns the code to send, if any.
    ///
    /// Any value, including card ids and unused keypad codes, counts as
    /// activity for the idle timeout.
    pub fn on_frame(&mut self, value: u32, now_ms: u64) -> Option<String> {
        self.on_key(KeyInput::from_code(value), now_ms)
            .map(|(code, _)| code)
    }

    /// Like [`on_frame`](Self::on_frame), also reporting why the code was
    /// sent.
    pub fn on_key(&mut self, key: KeyInput, now_ms: u64) -> Option<(String, FlushTrigger)> {
        self.last_activity_ms = now_ms;

        match key {
            // `Digit` is constructible by hand; only 0-9 extend the code
            KeyInput::Digit(_) => {
                if let Some(c) = key.as_char() {
                    self.pending.push(c);
                }
                None
            }
            KeyInput::Hash => Some((self.take(), FlushTrigger::Terminator)),
            KeyInput::Star => {
                self.pending.clear();
                Some((STAR_CODE.to_string(), FlushTrigger::Clear))
            }
            KeyInput::Other(_) => None,
        }
    }

    /// Called on cycles with no decoded frame. Sends a stale pending code.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_reader::KeyAssembler;
    ///
    /// let mut assembler = KeyAssembler::new();
    /// assembler.on_frame(5, 1_000);
    ///
    /// assert_eq!(assembler.on_idle(3_000), None);
    /// assert_eq!(assembler.on_idle(3_001), Some("5".to_string()));
    /// assert_eq!(assembler.on_idle(9_000), None);
    /// ```
    pub fn on_idle(&mut self, now_ms: u64) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        if now_ms.saturating_sub(self.last_activity_ms) > self.idle_timeout_ms {
            return Some(self.take());
        }
        None
    }

    fn take(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_digits_then_hash() {
        let mut assembler = KeyAssembler::new();
        let mut sent = Vec::new();
        for (i, value) in [1, 2, 3, 11].into_iter().enumerate() {
            sent.extend(assembler.on_frame(value, i as u64 * 100));
        }
        assert_eq!(sent, vec!["123".to_string()]);
        assert!(assembler.pending().is_empty());
    }

    #[test]
    fn test_hash_with_nothing_pending_sends_empty_code() {
        let mut assembler = KeyAssembler::new();
        assert_eq!(assembler.on_frame(11, 0), Some(String::new()));
    }

    #[test]
    fn test_star_discards_pending() {
        let mut assembler = KeyAssembler::new();
        assembler.on_frame(4, 0);
        assembler.on_frame(2, 10);

        let sent = assembler.on_key(KeyInput::Star, 20);

        assert_eq!(sent, Some(("*".to_string(), FlushTrigger::Clear)));
        assert!(assembler.pending().is_empty());
        assert_eq!(assembler.on_idle(10_000), None);
    }

    #[rstest]
    #[case(12)]
    #[case(15)]
    #[case(0x00AB_CDEF)]
    fn test_other_values_leave_sequence_but_refresh_activity(#[case] value: u32) {
        let mut assembler = KeyAssembler::new();
        assembler.on_frame(7, 0);

        assert_eq!(assembler.on_frame(value, 1_500), None);
        assert_eq!(assembler.pending(), "7");
        assert_eq!(assembler.last_activity_ms(), 1_500);

        // idle measured from the card swipe, not the digit
        assert_eq!(assembler.on_idle(2_500), None);
        assert_eq!(assembler.on_idle(3_501), Some("7".to_string()));
    }

    #[rstest]
    #[case(1_999, None)]
    #[case(2_000, None)]
    #[case(2_001, Some("5"))]
    fn test_idle_threshold_is_exclusive(#[case] elapsed: u64, #[case] expected: Option<&str>) {
        let mut assembler = KeyAssembler::new();
        assembler.on_frame(5, 100);
        assert_eq!(
            assembler.on_idle(100 + elapsed),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case(10)]
    #[case(12)]
    #[case(250)]
    fn test_out_of_range_digit_is_ignored(#[case] digit: u8) {
        let mut assembler = KeyAssembler::new();
        assembler.on_frame(4, 1_000);

        assert_eq!(assembler.on_key(KeyInput::Digit(digit), 1_100), None);
        assert_eq!(assembler.pending(), "4");
        assert_eq!(assembler.last_activity_ms(), 1_100);
    }

    #[test]
    fn test_idle_fires_once() {
        let mut assembler = KeyAssembler::new();
        assembler.on_frame(5, 0);

        assert_eq!(assembler.on_idle(2_001), Some("5".to_string()));
        assert_eq!(assembler.on_idle(4_002), None);
        assert_eq!(assembler.on_idle(100_000), None);
    }

    #[test]
    fn test_idle_with_nothing_pending() {
        let mut assembler = KeyAssembler::new();
        assert_eq!(assembler.on_idle(u64::MAX), None);
    }

    #[test]
    fn test_custom_idle_timeout() {
        let mut assembler = KeyAssembler::with_idle_timeout(50);
        assembler.on_frame(9, 0);
        assert_eq!(assembler.on_idle(51), Some("9".to_string()));
    }

    proptest! {
        #[test]
        fn prop_digits_then_hash_sends_digits(digits in prop::collection::vec(0u32..=9, 0..16)) {
            let mut assembler = KeyAssembler::new();
            for (i, digit) in digits.iter().enumerate() {
                prop_assert_eq!(assembler.on_frame(*digit, i as u64), None);
            }

            let expected: String = digits.iter().map(|d| d.to_string()).collect();
            let sent = assembler.on_frame(11, digits.len() as u64);

            prop_assert_eq!(sent, Some(expected));
            prop_assert!(assembler.pending().is_empty());
        }

        #[test]
        fn prop_pending_only_holds_digits(values in prop::collection::vec(0u32..=20, 0..32)) {
            let mut assembler = KeyAssembler::new();
            for (i, value) in values.iter().enumerate() {
                assembler.on_frame(*value, i as u64);
                prop_assert!(assembler.pending().chars().all(|c| c.is_ascii_digit()));
            }
        }
    }
}
