//! Error types for the Noise protocol core.
//!
//! Strongly-typed errors for the handshake state machine and the transport
//! cipher states. Every failure is reported to the immediate caller as a
//! typed result; nothing in this crate aborts the process. Configuration
//! mistakes (a PSK pattern without a PSK, a pre-message without a static
//! token) surface at construction time, not mid-handshake.

use sotto_crypto::CryptoError;
use thiserror::Error;

use crate::pattern::Token;

/// Errors from handshake and transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A write or read was attempted when it is the other party's turn.
    #[error("{operation} attempted out of turn")]
    RoleViolation {
        /// The operation that was attempted ("write" or "read")
        operation: &'static str,
    },

    /// A handshake message was attempted after the pattern completed.
    #[error("handshake already finished")]
    HandshakeFinished,

    /// An accessor valid only after completion was called mid-handshake.
    #[error("handshake still in progress")]
    HandshakeInProgress,

    /// Payload exceeds the Noise message-length ceiling.
    #[error("message too long: {len} bytes, maximum is {max}")]
    MessageTooLong {
        /// Length of the rejected payload
        len: usize,
        /// Maximum permitted length
        max: usize,
    },

    /// Inbound message ended before all pattern tokens were satisfied.
    #[error("message too short: token needs {expected} bytes, {actual} remain")]
    MessageTooShort {
        /// Bytes the current token requires
        expected: usize,
        /// Bytes remaining in the message
        actual: usize,
    },

    /// Ciphertext shorter than a single authentication tag.
    #[error("invalid ciphertext: {actual} bytes, need at least {minimum}")]
    InvalidCiphertext {
        /// Length of the ciphertext that was provided
        actual: usize,
        /// Minimum length an authenticated ciphertext can have
        minimum: usize,
    },

    /// A token referenced a key that is not present.
    #[error("missing {key} key for token {token}")]
    MissingKey {
        /// Which key is absent ("local ephemeral", "remote static", ...)
        key: &'static str,
        /// The token being processed
        token: Token,
    },

    /// A remote key arrived a second time.
    #[error("remote {key} key already set")]
    DuplicateKey {
        /// Which remote key was duplicated ("static" or "ephemeral")
        key: &'static str,
    },

    /// The pre-shared key is absent where required, or not 32 bytes.
    #[error("invalid pre-shared key: {reason}")]
    InvalidPsk {
        /// Why the PSK was rejected
        reason: String,
    },

    /// AEAD tag mismatch, or malformed public-key bytes.
    #[error("authentication failure")]
    AuthenticationFailure,

    /// A pre-message declared a token other than `s` or `e`.
    #[error("unsupported pre-message token {token}")]
    UnsupportedPreMessage {
        /// The offending token
        token: Token,
    },

    /// A persisted state named an algorithm absent from the catalog.
    #[error("unknown algorithm {name:?}")]
    UnknownAlgorithm {
        /// The unresolved protocol name
        name: String,
    },

    /// The nonce counter reached its reserved maximum value.
    #[error("nonce counter exhausted")]
    NonceExhausted,

    /// A handshake pattern failed structural validation.
    #[error("invalid handshake pattern: {reason}")]
    InvalidPattern {
        /// Why the pattern was rejected
        reason: String,
    },
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        match err {
            // Malformed key bytes and tag mismatches are indistinguishable
            // to the peer; both surface as authentication failures.
            CryptoError::AuthenticationFailure | CryptoError::InvalidPublicKey => {
                Self::AuthenticationFailure
            },
            CryptoError::CiphertextTooShort { actual, minimum } => {
                Self::InvalidCiphertext { actual, minimum }
            },
            CryptoError::DuplicateAlgorithm { name } => Self::UnknownAlgorithm { name },
        }
    }
}
