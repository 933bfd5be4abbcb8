//! Error types for the reader runtime.

use wiegand_hardware::HardwareError;

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors surfaced by [`WiegandReader`](crate::WiegandReader).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Configuration rejected by [`ReaderConfig::validate`](crate::ReaderConfig::validate).
    #[error("Invalid reader configuration: {0}")]
    InvalidConfig(String),

    /// An edge source or service consumer failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

impl ReaderError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
