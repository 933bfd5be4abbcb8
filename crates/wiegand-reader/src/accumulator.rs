//! Bit accumulation for the edge-capture side.
//!
//! [`RawBits`] holds the bits shifted in so far; [`WiegandBus`] owns it
//! behind a mutex shared by the edge producer and the polling loop. The
//! shifting arithmetic mirrors what keypad firmware on the other end of the
//! wire expects from a reader, including its quirk: every bit is shifted in
//! one position too far left, and the classifier shifts back once the frame
//! is complete.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use wiegand_core::DataLine;
use wiegand_core::constants::{HIGH_WORD_THRESHOLD, LOW_WORD_TOP_BIT};

/// Bits received since the last reset.
///
/// Up to 64 bits fit: the low word takes the first 31, then each new bit
/// moves the top of the low word into the high word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawBits {
    pub(crate) low: u32,
    pub(crate) high: u32,
    pub(crate) bit_count: u32,
    pub(crate) last_edge_ms: u64,
}

impl RawBits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the bit carried by an edge on `line`.
    ///
    /// Constant time, no allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegand_core::DataLine;
    /// use wiegand_reader::RawBits;
    ///
    /// let mut bits = RawBits::new();
    /// bits.push(DataLine::One, 10);
    /// bits.push(DataLine::Zero, 12);
    ///
    /// assert_eq!(bits.bit_count(), 2);
    /// // "10", pre-shifted one position
    /// assert_eq!(bits.low(), 0b100);
    /// assert_eq!(bits.last_edge_ms(), 12);
    /// ```
    pub fn push(&mut self, line: DataLine, at_ms: u64) {
        self.bit_count = self.bit_count.saturating_add(1);

        if self.bit_count > HIGH_WORD_THRESHOLD {
            self.high |= (self.low & LOW_WORD_TOP_BIT) >> 31;
            self.high <<= 1;
        }

        if line.bit() {
            self.low |= 1;
        }
        self.low <<= 1;

        self.last_edge_ms = at_ms;
    }

    /// Forget the accumulated bits. The last-edge time is kept.
    pub fn reset(&mut self) {
        self.low = 0;
        self.high = 0;
        self.bit_count = 0;
    }

    /// Low accumulator word.
    #[must_use]
    pub fn low(&self) -> u32 {
        self.low
    }

    /// High accumulator word (bits that overflowed the low word).
    #[must_use]
    pub fn high(&self) -> u32 {
        self.high
    }

    /// Number of edges received since the last reset.
    #[must_use]
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Timestamp of the most recent edge.
    #[must_use]
    pub fn last_edge_ms(&self) -> u64 {
        self.last_edge_ms
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }
}

/// Shared accumulator state.
///
/// Cloning is cheap; every clone refers to the same [`RawBits`]. Each access
/// is a critical section: the guard is released on every exit path,
/// including unwinding.
///
/// # Examples
///
/// ```
/// use wiegand_core::DataLine;
/// use wiegand_reader::WiegandBus;
///
/// let bus = WiegandBus::new();
/// let producer = bus.clone();
///
/// producer.record_edge(DataLine::One, 5);
///
/// let count = bus.with_bits(|bits| bits.bit_count());
/// assert_eq!(count, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WiegandBus {
    bits: Arc<Mutex<RawBits>>,
}

impl WiegandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one falling edge. Called from the edge-capture side.
    pub fn record_edge(&self, line: DataLine, at_ms: u64) {
        self.lock().push(line, at_ms);
    }

    /// Run `f` with exclusive access to the accumulated bits.
    pub fn with_bits<R>(&self, f: impl FnOnce(&mut RawBits) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RawBits {
        *self.lock()
    }

    /// Acquire the critical section.
    ///
    /// A poisoned lock is recovered: every mutation of [`RawBits`] leaves it
    /// consistent, so a panic elsewhere cannot corrupt it.
    pub fn lock(&self) -> MutexGuard<'_, RawBits> {
        self.bits.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
