//! # Error Types
//!
//! Parse errors for the textual forms of shared identity types.

use thiserror::Error;

/// Errors produced when parsing an address or hash from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid base58.
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),

    /// Input was not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded bytes had the wrong width.
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_length_message() {
        let err = ParseError::InvalidLength {
            expected: 32,
            got: 31,
        };
        assert!(err.to_string().contains("expected 32 bytes, got 31"));
    }
}
