use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Keypad errors
    #[error("Invalid key code: {0} (expected 0-15)")]
    InvalidKey(u32),

    #[error("Invalid key symbol: {0:?}")]
    InvalidKeySymbol(String),

    // Frame errors
    #[error("Card id {id} does not fit in {bits} data bits")]
    InvalidCardId { id: u64, bits: u8 },

    #[error("Invalid bit sequence: {0}")]
    InvalidBits(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidKey(16).to_string(),
            "Invalid key code: 16 (expected 0-15)"
        );
        assert_eq!(
            Error::InvalidCardId {
                id: 0x1FF_FFFF,
                bits: 24
            }
            .to_string(),
            "Card id 33554431 does not fit in 24 data bits"
        );
        assert_eq!(
            Error::InvalidKeySymbol("A".to_string()).to_string(),
            "Invalid key symbol: \"A\""
        );
    }
}
