//! X25519 Diffie-Hellman key agreement
//!
//! Key types for the `25519` curve of a Noise cipher suite: raw-byte import
//! and export, keypair generation, and the DH operation itself.
//!
//! # Security
//!
//! - Private keys and shared secrets are zeroized on drop.
//! - A DH output equal to all zeros means the peer supplied a low-order
//!   point; it is rejected in constant time (RFC 7748 Section 6.1, Noise
//!   spec Section 12.1).

use rand_core::OsRng;
use subtle::ConstantTimeEq;
use x25519_dalek::{PublicKey as DalekPublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// DH public-key and shared-secret length in bytes (X25519).
pub const DH_LEN: usize = 32;

/// An X25519 private key, usable as a static or an ephemeral key.
#[derive(Clone)]
pub struct PrivateKey(StaticSecret);

/// An X25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(DalekPublicKey);

/// A 32-byte DH shared secret, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; DH_LEN]);

impl PrivateKey {
    /// Generate a fresh random keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self(StaticSecret::random_from_rng(OsRng))
    }

    /// Import from raw 32-byte secret key material.
    pub fn from_bytes(bytes: [u8; DH_LEN]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Export the raw 32-byte secret key material.
    pub fn to_bytes(&self) -> [u8; DH_LEN] {
        self.0.to_bytes()
    }

    /// The public key corresponding to this private key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(DalekPublicKey::from(&self.0))
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

impl PublicKey {
    /// Import from raw 32-byte public key material.
    pub fn from_bytes(bytes: [u8; DH_LEN]) -> Self {
        Self(DalekPublicKey::from(bytes))
    }

    /// Import from a byte slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; DH_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self::from_bytes(raw))
    }

    /// The raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; DH_LEN] {
        self.0.as_bytes()
    }
}

impl SharedSecret {
    /// The raw 32-byte shared secret.
    pub fn as_bytes(&self) -> &[u8; DH_LEN] {
        &self.0
    }
}

impl core::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// `DH(private, public)`.
///
/// # Errors
///
/// `InvalidPublicKey` if the result is the all-zeros value, which means the
/// peer's point is low-order.
pub fn diffie_hellman(local: &PrivateKey, remote: &PublicKey) -> Result<SharedSecret, CryptoError> {
    let shared = local.0.diffie_hellman(&remote.0);
    let bytes = *shared.as_bytes();
    if bool::from(bytes.ct_eq(&[0u8; DH_LEN])) {
        return Err(CryptoError::InvalidPublicKey);
    }
    Ok(SharedSecret(bytes))
}
