//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use wiegand_core::DataLine;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Mock Wiegand Lines").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// GPIO pins of the D0/D1 lines, when the device is wired to pins.
    pub pins: Option<LinePins>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            pins: None,
            firmware_version: None,
        }
    }

    /// Set the line pins.
    pub fn with_pins(mut self, pins: LinePins) -> Self {
        self.pins = Some(pins);
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// GPIO pins the two data lines are wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinePins {
    /// Pin of the D0 ("zero") line.
    pub d0: u8,

    /// Pin of the D1 ("one") line.
    pub d1: u8,
}

impl LinePins {
    pub fn new(d0: u8, d1: u8) -> Self {
        Self { d0, d1 }
    }

    /// Pin a data line is wired to.
    #[must_use]
    pub fn pin(&self, line: DataLine) -> u8 {
        match line {
            DataLine::Zero => self.d0,
            DataLine::One => self.d1,
        }
    }

    /// Data line wired to a pin, if any.
    #[must_use]
    pub fn line(&self, pin: u8) -> Option<DataLine> {
        if pin == self.d0 {
            Some(DataLine::Zero)
        } else if pin == self.d1 {
            Some(DataLine::One)
        } else {
            None
        }
    }
}

/// A falling edge observed on one of the data lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvent {
    /// Line the edge was observed on.
    pub line: DataLine,

    /// Monotonic timestamp of the edge in milliseconds.
    pub at_ms: u64,
}

impl EdgeEvent {
    pub fn new(line: DataLine, at_ms: u64) -> Self {
        Self { line, at_ms }
    }
}
