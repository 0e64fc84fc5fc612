//! Error types for primitive operations

use thiserror::Error;

/// Errors from AEAD, DH, and catalog operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD open failed: the authentication tag did not verify.
    #[error("AEAD authentication failed")]
    AuthenticationFailure,

    /// Ciphertext shorter than a single authentication tag.
    #[error("ciphertext too short: {actual} bytes, need at least {minimum}")]
    CiphertextTooShort {
        /// Length of the ciphertext that was provided
        actual: usize,
        /// Minimum length an authenticated ciphertext can have
        minimum: usize,
    },

    /// A public key could not be used: wrong length, or the DH output was
    /// the all-zeros value (low-order point).
    #[error("invalid public key")]
    InvalidPublicKey,

    /// An algorithm with this protocol name is already registered.
    #[error("algorithm {name:?} is already registered")]
    DuplicateAlgorithm {
        /// Protocol name of the rejected registration
        name: String,
    },
}
