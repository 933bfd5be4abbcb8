//! Reader configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiegand_core::constants::{
    DEFAULT_D0_PIN, DEFAULT_D1_PIN, DEFAULT_EVENT_BUFFER, DEFAULT_SERVICE, POLL_INTERVAL_MS,
};
use wiegand_hardware::LinePins;

use crate::error::{ReaderError, Result};

/// Settings for a [`WiegandReader`](crate::WiegandReader).
///
/// # Examples
///
/// ```
/// use wiegand_reader::ReaderConfig;
///
/// let config = ReaderConfig {
///     service: "esphome.front_door".to_string(),
///     ..ReaderConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.poll_interval_ms, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Pin wired to D0.
    pub d0_pin: u8,

    /// Pin wired to D1.
    pub d1_pin: u8,

    /// Service invoked with each entered code.
    pub service: String,

    /// Polling cadence of the classifier.
    pub poll_interval_ms: u64,

    /// Capacity of the reader event channel.
    pub event_buffer: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            d0_pin: DEFAULT_D0_PIN,
            d1_pin: DEFAULT_D1_PIN,
            service: DEFAULT_SERVICE.to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ReaderConfig {
    /// Check the configuration for values the reader cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidConfig`] if both lines share a pin, the
    /// service name is blank, or the poll interval or event buffer is zero.
    pub fn validate(&self) -> Result<()> {
        if self.d0_pin == self.d1_pin {
            return Err(ReaderError::invalid_config(format!(
                "d0 and d1 both on pin {}",
                self.d0_pin
            )));
        }
        if self.service.trim().is_empty() {
            return Err(ReaderError::invalid_config("service name is empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ReaderError::invalid_config(
                "poll interval must be at least 1 ms",
            ));
        }
        if self.event_buffer == 0 {
            return Err(ReaderError::invalid_config(
                "event buffer must hold at least one event",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn pins(&self) -> LinePins {
        LinePins::new(self.d0_pin, self.d1_pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.d0_pin, 4);
        assert_eq!(config.d1_pin, 5);
        assert_eq!(config.service, "esphome.wiegand_code");
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.event_buffer, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReaderConfig =
            serde_json::from_str(r#"{ "service": "esphome.gate", "d0_pin": 12 }"#).unwrap();
        assert_eq!(config.service, "esphome.gate");
        assert_eq!(config.d0_pin, 12);
        assert_eq!(config.d1_pin, 5);
        assert_eq!(config.poll_interval_ms, 200);
    }

    #[rstest]
    #[case(ReaderConfig { d1_pin: 4, ..ReaderConfig::default() }, "pin 4")]
    #[case(ReaderConfig { service: "  ".to_string(), ..ReaderConfig::default() }, "service")]
    #[case(ReaderConfig { poll_interval_ms: 0, ..ReaderConfig::default() }, "poll interval")]
    #[case(ReaderConfig { event_buffer: 0, ..ReaderConfig::default() }, "event buffer")]
    fn test_validate_rejects(#[case] config: ReaderConfig, #[case] needle: &str) {
        let error = config.validate().unwrap_err();
        assert!(matches!(error, ReaderError::InvalidConfig(_)));
        assert!(error.to_string().contains(needle), "{}", error);
    }

    #[test]
    fn test_pins() {
        let config = ReaderConfig {
            d0_pin: 14,
            d1_pin: 27,
            ..ReaderConfig::default()
        };
        assert_eq!(config.pins(), LinePins::new(14, 27));
    }
}
