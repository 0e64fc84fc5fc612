//! AEAD cipher functions for the Noise cipher suite
//!
//! Implements the two cipher functions of the Noise specification:
//!
//! - `ChaChaPoly`: ChaCha20-Poly1305 (RFC 8439)
//! - `AESGCM`: AES-256-GCM (NIST SP 800-38D)
//!
//! Both take a 64-bit counter nonce and map it to the 12-byte AEAD nonce in
//! the algorithm-specific, non-configurable way the Noise spec fixes:
//! 4 zero bytes followed by the 8-byte counter, little-endian for ChaChaPoly
//! and big-endian for AESGCM.

use aes_gcm::Aes256Gcm;
use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::error::CryptoError;

/// AEAD key length in bytes.
pub const AEAD_KEY_LEN: usize = 32;
/// AEAD authentication tag length in bytes.
pub const AEAD_TAG_LEN: usize = 16;
/// AEAD nonce length in bytes.
pub const AEAD_NONCE_LEN: usize = 12;

/// An AEAD cipher usable as the cipher function of a Noise cipher suite.
///
/// Implementations are stateless: the caller (a cipher state) owns the key
/// and the nonce counter. The protocol name tags the implementation for
/// suite naming and for resolving persisted state.
pub trait CipherAlgorithm: Send + Sync {
    /// Name of this cipher as it appears in a Noise protocol name.
    fn protocol_name(&self) -> &'static str;

    /// Seal `plaintext` under `key`, the counter `nonce`, and associated
    /// data `ad`. Returns ciphertext with the 16-byte tag appended.
    fn encrypt(&self, key: &[u8; AEAD_KEY_LEN], nonce: u64, ad: &[u8], plaintext: &[u8])
    -> Vec<u8>;

    /// Open `ciphertext` (which carries a trailing 16-byte tag) under `key`,
    /// the counter `nonce`, and associated data `ad`.
    ///
    /// # Errors
    ///
    /// - `CiphertextTooShort` if `ciphertext` is shorter than one tag
    /// - `AuthenticationFailure` if the tag does not verify
    fn decrypt(
        &self,
        key: &[u8; AEAD_KEY_LEN],
        nonce: u64,
        ad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}

/// ChaCha20-Poly1305, protocol name `ChaChaPoly`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaChaPolyCipher;

impl CipherAlgorithm for ChaChaPolyCipher {
    fn protocol_name(&self) -> &'static str {
        "ChaChaPoly"
    }

    fn encrypt(
        &self,
        key: &[u8; AEAD_KEY_LEN],
        nonce: u64,
        ad: &[u8],
        plaintext: &[u8],
    ) -> Vec<u8> {
        let cipher = ChaCha20Poly1305::new(key.into());
        let nonce_bytes = chacha_nonce(nonce);
        let payload = Payload { msg: plaintext, aad: ad };

        let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce_bytes), payload) else {
            unreachable!("ChaCha20-Poly1305 encryption cannot fail with valid inputs");
        };
        ciphertext
    }

    fn decrypt(
        &self,
        key: &[u8; AEAD_KEY_LEN],
        nonce: u64,
        ad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        check_tag_length(ciphertext)?;

        let cipher = ChaCha20Poly1305::new(key.into());
        let nonce_bytes = chacha_nonce(nonce);
        let payload = Payload { msg: ciphertext, aad: ad };

        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), payload)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

/// AES-256-GCM, protocol name `AESGCM`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmCipher;

impl CipherAlgorithm for AesGcmCipher {
    fn protocol_name(&self) -> &'static str {
        "AESGCM"
    }

    fn encrypt(
        &self,
        key: &[u8; AEAD_KEY_LEN],
        nonce: u64,
        ad: &[u8],
        plaintext: &[u8],
    ) -> Vec<u8> {
        let cipher = Aes256Gcm::new(key.into());
        let nonce_bytes = gcm_nonce(nonce);
        let payload = Payload { msg: plaintext, aad: ad };

        let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce_bytes), payload) else {
            unreachable!("AES-256-GCM encryption cannot fail with valid inputs");
        };
        ciphertext
    }

    fn decrypt(
        &self,
        key: &[u8; AEAD_KEY_LEN],
        nonce: u64,
        ad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        check_tag_length(ciphertext)?;

        let cipher = Aes256Gcm::new(key.into());
        let nonce_bytes = gcm_nonce(nonce);
        let payload = Payload { msg: ciphertext, aad: ad };

        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), payload)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

/// Reject ciphertexts that cannot contain an authentication tag.
fn check_tag_length(ciphertext: &[u8]) -> Result<(), CryptoError> {
    if ciphertext.len() < AEAD_TAG_LEN {
        return Err(CryptoError::CiphertextTooShort {
            actual: ciphertext.len(),
            minimum: AEAD_TAG_LEN,
        });
    }
    Ok(())
}

/// ChaChaPoly nonce: 4 zero bytes || 64-bit little-endian counter.
fn chacha_nonce(n: u64) -> [u8; AEAD_NONCE_LEN] {
    let mut nonce = [0u8; AEAD_NONCE_LEN];
    nonce[4..].copy_from_slice(&n.to_le_bytes());
    nonce
}

/// AESGCM nonce: 4 zero bytes || 64-bit big-endian counter.
fn gcm_nonce(n: u64) -> [u8; AEAD_NONCE_LEN] {
    let mut nonce = [0u8; AEAD_NONCE_LEN];
    nonce[4..].copy_from_slice(&n.to_be_bytes());
    nonce
}
