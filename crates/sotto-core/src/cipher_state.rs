//! AEAD cipher state
//!
//! A [`CipherState`] pairs an optional 32-byte key with a 64-bit counter
//! nonce. Unkeyed, it passes data through untouched (the early, unencrypted
//! phase of a handshake). Keyed, every encryption consumes one nonce value;
//! a decryption consumes its nonce only on success, so a failed or tampered
//! message never desynchronizes the counter.
//!
//! The counter value `u64::MAX` is reserved and never used with the AEAD.
//! Reaching it makes the state permanently unusable for new messages;
//! callers are expected to rekey long before that point.

use std::sync::Arc;

use sotto_crypto::{AEAD_KEY_LEN, AEAD_TAG_LEN, CipherAlgorithm};
use zeroize::Zeroizing;

use crate::MAX_MESSAGE_LEN;
use crate::error::Error;

/// Counter value reserved by the Noise spec; never used as an AEAD nonce.
const NONCE_RESERVED: u64 = u64::MAX;

/// An AEAD key, counter nonce, and the cipher they drive.
pub struct CipherState {
    cipher: Arc<dyn CipherAlgorithm>,
    key: Option<Zeroizing<[u8; AEAD_KEY_LEN]>>,
    nonce: u64,
}

impl CipherState {
    /// An unkeyed state: encrypt and decrypt pass data through unchanged.
    pub fn new(cipher: Arc<dyn CipherAlgorithm>) -> Self {
        Self { cipher, key: None, nonce: 0 }
    }

    /// A keyed state with the nonce counter at zero.
    pub fn with_key(cipher: Arc<dyn CipherAlgorithm>, key: [u8; AEAD_KEY_LEN]) -> Self {
        Self { cipher, key: Some(Zeroizing::new(key)), nonce: 0 }
    }

    /// Install (or clear) the key and reset the nonce counter to zero.
    pub fn initialize_key(&mut self, key: Option<[u8; AEAD_KEY_LEN]>) {
        self.key = key.map(Zeroizing::new);
        self.nonce = 0;
    }

    /// Whether a key is installed.
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Current nonce counter value.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Set the nonce counter, e.g. when handling out-of-order transport
    /// messages under an external sequencing scheme.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
    }

    /// Encrypt `plaintext` bound to `ad`, consuming one nonce value.
    ///
    /// Unkeyed states return the plaintext unchanged without touching the
    /// counter.
    ///
    /// # Errors
    ///
    /// - `NonceExhausted` if the counter holds the reserved maximum.
    /// - `MessageTooLong` if the resulting ciphertext would exceed the Noise
    ///   message ceiling.
    pub fn encrypt_with_ad(&mut self, ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let Some(key) = &self.key else {
            return Ok(plaintext.to_vec());
        };
        if plaintext.len() > MAX_MESSAGE_LEN - AEAD_TAG_LEN {
            return Err(Error::MessageTooLong {
                len: plaintext.len() + AEAD_TAG_LEN,
                max: MAX_MESSAGE_LEN,
            });
        }
        if self.nonce == NONCE_RESERVED {
            return Err(Error::NonceExhausted);
        }
        let ciphertext = self.cipher.encrypt(key, self.nonce, ad, plaintext);
        self.nonce += 1;
        Ok(ciphertext)
    }

    /// Decrypt `ciphertext` bound to `ad`.
    ///
    /// The nonce advances only when authentication succeeds. Unkeyed states
    /// return the input unchanged without touching the counter.
    ///
    /// # Errors
    ///
    /// - `NonceExhausted` if the counter holds the reserved maximum.
    /// - `MessageTooLong` if the ciphertext exceeds the message ceiling.
    /// - `InvalidCiphertext` if it is shorter than one authentication tag.
    /// - `AuthenticationFailure` on tag mismatch.
    pub fn decrypt_with_ad(&mut self, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let Some(key) = &self.key else {
            return Ok(ciphertext.to_vec());
        };
        if ciphertext.len() > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong { len: ciphertext.len(), max: MAX_MESSAGE_LEN });
        }
        if self.nonce == NONCE_RESERVED {
            return Err(Error::NonceExhausted);
        }
        let plaintext = self.cipher.decrypt(key, self.nonce, ad, ciphertext)?;
        self.nonce += 1;
        Ok(plaintext)
    }

    /// Replace the key and reset the nonce counter to zero.
    ///
    /// The new key has never been used with any counter value, so restarting
    /// at zero preserves key/nonce uniqueness. Both directions of a session
    /// must rekey at the same point in the stream to stay in step.
    pub fn rekey(&mut self, key: [u8; AEAD_KEY_LEN]) {
        self.key = Some(Zeroizing::new(key));
        self.nonce = 0;
    }

    /// The cipher this state drives; used when persisting.
    pub(crate) fn cipher(&self) -> &Arc<dyn CipherAlgorithm> {
        &self.cipher
    }

    /// Raw key bytes; used when persisting.
    pub(crate) fn key_bytes(&self) -> Option<&[u8; AEAD_KEY_LEN]> {
        self.key.as_deref()
    }

    /// Rebuild a state from persisted parts.
    pub(crate) fn from_parts(
        cipher: Arc<dyn CipherAlgorithm>,
        key: Option<[u8; AEAD_KEY_LEN]>,
        nonce: u64,
    ) -> Self {
        Self { cipher, key: key.map(Zeroizing::new), nonce }
    }
}

impl core::fmt::Debug for CipherState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CipherState")
            .field("cipher", &self.cipher.protocol_name())
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("nonce", &self.nonce)
            .finish()
    }
}
