//! Sotto Cryptographic Primitives
//!
//! Primitive capability layer for the Sotto Noise protocol core. The protocol
//! state machine in `sotto-core` never touches a concrete algorithm directly:
//! it works against the [`CipherAlgorithm`] and [`HashFunction`] traits and
//! the X25519 key-agreement functions defined here.
//!
//! # Capabilities
//!
//! - [`CipherAlgorithm`]: AEAD seal/open keyed by a 32-byte key and a 64-bit
//!   counter nonce, implemented by [`ChaChaPolyCipher`] and [`AesGcmCipher`].
//! - [`HashFunction`]: hashing plus the Noise HKDF (2 or 3 output blocks),
//!   implemented by [`Sha256Hash`] and [`Sha512Hash`].
//! - [`dh`]: X25519 key agreement with keypair generation and raw-byte
//!   import/export.
//! - [`AlgorithmCatalog`]: a name-to-implementation table, built once at
//!   startup and passed by reference wherever algorithm names must be
//!   resolved (suite construction, persisted-state decoding).
//!
//! # Security
//!
//! - Every implementation is tagged with the protocol name string that feeds
//!   the Noise protocol-name derivation; two implementations interoperate
//!   only if their name strings and semantics match bit-exactly.
//! - DH outputs equal to all zeros (low-order peer points) are rejected in
//!   constant time.
//! - Shared secrets and derived key blocks are zeroized on drop.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod catalog;
pub mod dh;
pub mod error;
pub mod hash;

pub use aead::{AEAD_KEY_LEN, AEAD_TAG_LEN, AesGcmCipher, ChaChaPolyCipher, CipherAlgorithm};
pub use catalog::AlgorithmCatalog;
pub use dh::{DH_LEN, PrivateKey, PublicKey, SharedSecret, diffie_hellman};
pub use error::CryptoError;
pub use hash::{HashFunction, Sha256Hash, Sha512Hash};
