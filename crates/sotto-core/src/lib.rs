//! Sotto Noise Protocol Core
//!
//! An implementation of the Noise Protocol Framework handshake and transport
//! state machine (revision 34 of the Noise spec): the fifteen fundamental
//! handshake patterns and their `pskN` variants, over the algorithms
//! registered in a `sotto-crypto` [`AlgorithmCatalog`].
//!
//! # Layering
//!
//! - [`CipherState`]: an AEAD key plus a 64-bit counter nonce.
//! - [`SymmetricState`]: chaining key and transcript hash, driving an inner
//!   cipher state; supports checkpoint/rollback of the transcript.
//! - [`HandshakeState`]: the pattern token interpreter. Built from a
//!   [`HandshakeConfig`], it writes and reads handshake messages in turn
//!   order and, once finished, yields [`TransportCiphers`] and a
//!   channel-binding hash.
//!
//! # Example
//!
//! ```
//! use sotto_core::{CipherSuite, HandshakeConfig, HandshakeState, PatternKind};
//!
//! # fn main() -> Result<(), sotto_core::Error> {
//! let suite = CipherSuite::chachapoly_sha256();
//! let mut alice =
//!     HandshakeState::new(HandshakeConfig::initiator(PatternKind::NN.pattern(), suite.clone()))?;
//! let mut bob =
//!     HandshakeState::new(HandshakeConfig::responder(PatternKind::NN.pattern(), suite))?;
//!
//! let m1 = alice.write_message(b"hello")?;
//! assert_eq!(bob.read_message(&m1)?, b"hello");
//! let m2 = bob.write_message(b"")?;
//! alice.read_message(&m2)?;
//!
//! assert_eq!(alice.channel_binding()?, bob.channel_binding()?);
//! let transport = alice.transport_ciphers()?;
//! let (mut to_bob, _from_bob) = transport.into_pair(true);
//! let ciphertext = to_bob.encrypt_with_ad(b"", b"first transport message")?;
//! # let _ = ciphertext;
//! # Ok(())
//! # }
//! ```
//!
//! # Scope
//!
//! Message framing, retries, and key storage are the caller's concern; this
//! crate is synchronous, allocation-light, and free of I/O.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher_state;
pub mod error;
pub mod handshake;
pub mod pattern;
pub mod persist;
pub mod suite;
pub mod symmetric_state;

pub use cipher_state::CipherState;
pub use error::Error;
pub use handshake::{HandshakeConfig, HandshakeState, TransportCiphers};
pub use pattern::{Direction, HandshakePattern, MessagePattern, PatternKind, Token};
pub use persist::{CipherStateRecord, SymmetricStateRecord};
pub use suite::{CipherSuite, KeyCurve};
pub use symmetric_state::SymmetricState;

/// Maximum length of a Noise message in bytes, ciphertext and keys included.
pub const MAX_MESSAGE_LEN: usize = 65_535;
