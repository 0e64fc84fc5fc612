//! Symmetric handshake state
//!
//! A [`SymmetricState`] owns the chaining key `ck`, the transcript hash `h`,
//! and an inner [`CipherState`]. Every byte a handshake sends or receives is
//! absorbed into `h`, so both parties maintain an identical transcript; every
//! secret a handshake establishes is folded into `ck` through the Noise HKDF.
//!
//! `checkpoint`/`rollback` snapshot and restore `(ck, h)` as a pair, letting
//! a handshake undo the transcript effects of an inbound message that failed
//! authentication partway through.

use std::sync::Arc;

use sotto_crypto::{AEAD_KEY_LEN, CipherAlgorithm, HashFunction};
use zeroize::Zeroizing;

use crate::cipher_state::CipherState;
use crate::error::Error;

/// Chaining key, transcript hash, and the cipher state they key.
pub struct SymmetricState {
    hash: Arc<dyn HashFunction>,
    cipher_state: CipherState,
    chaining_key: Zeroizing<Vec<u8>>,
    transcript_hash: Vec<u8>,
    checkpoint_chaining_key: Zeroizing<Vec<u8>>,
    checkpoint_transcript_hash: Vec<u8>,
}

impl SymmetricState {
    /// Initialize from a full protocol name.
    ///
    /// Names no longer than the digest are zero-padded into `h` directly;
    /// longer names are hashed. `ck` starts equal to `h` and the cipher
    /// state starts unkeyed.
    pub fn new(
        hash: Arc<dyn HashFunction>,
        cipher: Arc<dyn CipherAlgorithm>,
        protocol_name: &str,
    ) -> Self {
        let name = protocol_name.as_bytes();
        let transcript_hash = if name.len() <= hash.hash_len() {
            let mut padded = vec![0u8; hash.hash_len()];
            padded[..name.len()].copy_from_slice(name);
            padded
        } else {
            hash.hash(name)
        };

        Self {
            cipher_state: CipherState::new(cipher),
            chaining_key: Zeroizing::new(transcript_hash.clone()),
            checkpoint_chaining_key: Zeroizing::new(transcript_hash.clone()),
            checkpoint_transcript_hash: transcript_hash.clone(),
            transcript_hash,
            hash,
        }
    }

    /// `h = HASH(h || data)`.
    pub fn mix_hash(&mut self, data: &[u8]) {
        self.transcript_hash = self.hash.hash_two(&self.transcript_hash, data);
    }

    /// Fold key material into `ck` and key the cipher state with the
    /// second HKDF output, truncated to 32 bytes for 64-byte digests.
    pub fn mix_key(&mut self, input_key_material: &[u8]) {
        let (ck, temp_key) = self.hash.hkdf2(&self.chaining_key, input_key_material);
        self.chaining_key = ck;
        self.cipher_state.initialize_key(Some(truncate_key(&temp_key)));
    }

    /// Fold key material into both `ck` and `h`; used for PSK tokens so the
    /// secret influences the transcript as well as the keys.
    pub fn mix_key_and_hash(&mut self, input_key_material: &[u8]) {
        let (ck, temp_hash, temp_key) = self.hash.hkdf3(&self.chaining_key, input_key_material);
        self.chaining_key = ck;
        self.mix_hash(&temp_hash);
        self.cipher_state.initialize_key(Some(truncate_key(&temp_key)));
    }

    /// Encrypt with the transcript hash as associated data, then absorb the
    /// ciphertext into the transcript. Pass-through while unkeyed.
    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let ciphertext = self.cipher_state.encrypt_with_ad(&self.transcript_hash, plaintext)?;
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    /// Decrypt with the transcript hash as associated data, then absorb the
    /// ciphertext into the transcript. The transcript only advances when
    /// authentication succeeds.
    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let plaintext = self.cipher_state.decrypt_with_ad(&self.transcript_hash, ciphertext)?;
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// Whether the inner cipher state holds a key yet.
    pub fn has_key(&self) -> bool {
        self.cipher_state.has_key()
    }

    /// The current transcript hash `h`; once a handshake completes this is
    /// the channel-binding value.
    pub fn transcript_hash(&self) -> &[u8] {
        &self.transcript_hash
    }

    /// Snapshot `(ck, h)` for a later [`rollback`](Self::rollback).
    pub fn checkpoint(&mut self) {
        self.checkpoint_chaining_key = self.chaining_key.clone();
        self.checkpoint_transcript_hash = self.transcript_hash.clone();
    }

    /// Restore `(ck, h)` to the last checkpoint.
    pub fn rollback(&mut self) {
        self.chaining_key = self.checkpoint_chaining_key.clone();
        self.transcript_hash = self.checkpoint_transcript_hash.clone();
    }

    /// Derive the two directional transport cipher states from
    /// `HKDF(ck, empty, 2)`: first output keys initiator-to-responder
    /// traffic, second keys responder-to-initiator.
    pub fn split(&self) -> (CipherState, CipherState) {
        let (key_one, key_two) = self.hash.hkdf2(&self.chaining_key, &[]);
        (
            CipherState::with_key(Arc::clone(self.cipher_state.cipher()), truncate_key(&key_one)),
            CipherState::with_key(Arc::clone(self.cipher_state.cipher()), truncate_key(&key_two)),
        )
    }

    pub(crate) fn hash_function(&self) -> &Arc<dyn HashFunction> {
        &self.hash
    }

    pub(crate) fn cipher_state(&self) -> &CipherState {
        &self.cipher_state
    }

    pub(crate) fn chaining_key(&self) -> &[u8] {
        &self.chaining_key
    }

    pub(crate) fn checkpoint_chaining_key(&self) -> &[u8] {
        &self.checkpoint_chaining_key
    }

    pub(crate) fn checkpoint_transcript_hash(&self) -> &[u8] {
        &self.checkpoint_transcript_hash
    }

    /// Rebuild a state from persisted parts.
    pub(crate) fn from_parts(
        hash: Arc<dyn HashFunction>,
        cipher_state: CipherState,
        chaining_key: Vec<u8>,
        transcript_hash: Vec<u8>,
        checkpoint_chaining_key: Vec<u8>,
        checkpoint_transcript_hash: Vec<u8>,
    ) -> Self {
        Self {
            hash,
            cipher_state,
            chaining_key: Zeroizing::new(chaining_key),
            transcript_hash,
            checkpoint_chaining_key: Zeroizing::new(checkpoint_chaining_key),
            checkpoint_transcript_hash,
        }
    }
}

impl core::fmt::Debug for SymmetricState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SymmetricState")
            .field("hash", &self.hash.protocol_name())
            .field("cipher_state", &self.cipher_state)
            .field("keyed", &self.has_key())
            .finish()
    }
}

/// First 32 bytes of an HKDF output block; a no-op for 32-byte digests.
fn truncate_key(block: &[u8]) -> [u8; AEAD_KEY_LEN] {
    let mut key = [0u8; AEAD_KEY_LEN];
    key.copy_from_slice(&block[..AEAD_KEY_LEN]);
    key
}
