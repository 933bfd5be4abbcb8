//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod lines;
pub mod service;

// Re-export commonly used types
pub use lines::{MockWiegandLines, MockWiegandLinesHandle};
pub use service::{MockServiceCaller, MockServiceCallerHandle};
