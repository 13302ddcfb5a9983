//! Error types for key material operations.

use thiserror::Error;

/// Result type alias for key material operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Key material errors.
///
/// None of these carry key or IV bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cipher name could not be resolved by the registry.
    #[error("Unknown cipher algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Key buffer does not match the cipher's key size.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Key size required by the cipher, in bytes.
        expected: usize,
        /// Length of the rejected buffer, in bytes.
        actual: usize,
    },

    /// IV buffer does not match the cipher's IV size.
    #[error("Invalid IV length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// IV size required by the cipher, in bytes.
        expected: usize,
        /// Length of the rejected buffer, in bytes.
        actual: usize,
    },

    /// Iteration count must be at least 1.
    #[error("Invalid iteration count: {0}")]
    InvalidIterationCount(u32),

    /// The secure random source failed to produce bytes.
    #[error("Secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_key_length() {
        let err = Error::InvalidKeyLength {
            expected: 32,
            actual: 31,
        };
        assert_eq!(err.to_string(), "Invalid key length: expected 32, got 31");
    }

    #[test]
    fn test_display_unknown_algorithm() {
        let err = Error::UnknownAlgorithm("rot13".into());
        assert_eq!(err.to_string(), "Unknown cipher algorithm: rot13");
    }

    #[test]
    fn test_display_invalid_iteration_count() {
        assert_eq!(
            Error::InvalidIterationCount(0).to_string(),
            "Invalid iteration count: 0"
        );
    }
}
