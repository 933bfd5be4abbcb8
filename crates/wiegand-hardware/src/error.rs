//! Error types for line sources and service consumers.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Ways a line source or a service transport can fail.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The edge channel of a line source is gone.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The device cannot do what was asked (e.g. a card frame on a keypad
    /// helper).
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// The service consumer rejected or did not receive a call.
    #[error("Service call {service} failed: {message}")]
    ServiceCallFailed { service: String, message: String },

    /// A synthetic frame could not be encoded.
    #[error(transparent)]
    Frame(#[from] wiegand_core::Error),

    /// Writing a call to its output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn service_call(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceCallFailed {
            service: service.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("Wiegand lines");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: Wiegand lines");
    }

    #[test]
    fn test_service_call_error() {
        let error = HardwareError::service_call("esphome.door", "api offline");
        assert_eq!(
            error.to_string(),
            "Service call esphome.door failed: api offline"
        );
    }

    #[test]
    fn test_frame_error_is_transparent() {
        let error: HardwareError = wiegand_core::Error::InvalidKey(20).into();
        assert_eq!(error.to_string(), "Invalid key code: 20 (expected 0-15)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let error: HardwareError = io.into();
        assert!(matches!(error, HardwareError::Io(_)));
        assert_eq!(error.to_string(), "I/O error: stdout closed");
    }
}
