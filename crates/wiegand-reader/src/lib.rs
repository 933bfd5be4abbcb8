//! Wiegand frame decoding and key sequence assembly.
//!
//! The decoding pipeline runs in three stages:
//!
//! 1. [`WiegandBus`] accumulates one bit per falling edge on D0 or D1.
//! 2. [`FrameClassifier`] waits for the lines to go quiet, then turns the
//!    accumulated bits into a keypad key or card id (or drops them).
//! 3. [`KeyAssembler`] collects digits into a code, sent on `#`, on `*`
//!    (as `*`) or after two seconds without input.
//!
//! [`WiegandReader`] drives the stages from a polling loop and delivers
//! finished codes to a [`ServiceCaller`](wiegand_hardware::ServiceCaller).
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use wiegand_core::{KeyInput, WiegandFrame};
//! use wiegand_hardware::clock::ManualClock;
//! use wiegand_hardware::mock::MockServiceCaller;
//! use wiegand_hardware::traits::Clock;
//! use wiegand_reader::{ReaderConfig, WiegandReader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let clock = ManualClock::new();
//!     let (sink, calls) = MockServiceCaller::new();
//!     let mut reader =
//!         WiegandReader::new(ReaderConfig::default(), sink, Arc::new(clock.clone()))?;
//!
//!     for key in [KeyInput::Digit(4), KeyInput::Digit(2), KeyInput::Hash] {
//!         for line in WiegandFrame::keypad8(key)?.lines() {
//!             reader.bus().record_edge(line, clock.now_ms());
//!         }
//!         clock.advance(50);
//!         reader.poll().await;
//!     }
//!
//!     assert_eq!(calls.codes(), vec!["42".to_string()]);
//!     Ok(())
//! }
//! ```

pub mod accumulator;
pub mod assembler;
pub mod classifier;
pub mod config;
pub mod error;
pub mod reader;

pub use accumulator::{RawBits, WiegandBus};
pub use assembler::{FlushTrigger, KeyAssembler};
pub use classifier::{Classification, FrameClassifier};
pub use config::ReaderConfig;
pub use error::{ReaderError, Result};
pub use reader::{Emission, PollOutcome, ReaderEvent, ReaderHandle, ReaderStats, WiegandReader};
