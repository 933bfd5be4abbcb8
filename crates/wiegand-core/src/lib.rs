//! Core types and constants for the Wiegand keypad reader.
//!
//! Shared by the hardware seams, the decoder and the CLI: fixed protocol
//! timings, the accepted frame widths, decoded-frame types and the synthetic
//! frame encoder used by mocks and tests.

pub mod constants;
pub mod error;
pub mod frame;
pub mod types;

pub use error::{Error, Result};
pub use frame::WiegandFrame;
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
