//! Persisted state records
//!
//! Serde-derived snapshots of the cipher and symmetric states, for sessions
//! that must survive a process restart. Algorithms are stored by protocol
//! name and resolved against an [`AlgorithmCatalog`] on restore, so a state
//! captured by one build restores on another as long as the catalog still
//! registers the named algorithms.
//!
//! Records carry raw key material. Protecting them at rest is the caller's
//! responsibility.

use serde::{Deserialize, Serialize};
use sotto_crypto::{AEAD_KEY_LEN, AlgorithmCatalog};

use crate::cipher_state::CipherState;
use crate::error::Error;
use crate::symmetric_state::SymmetricState;

/// Snapshot of a [`CipherState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherStateRecord {
    /// Protocol name of the cipher (`"ChaChaPoly"`, `"AESGCM"`)
    pub cipher: String,
    /// AEAD key, absent for unkeyed states
    pub key: Option<[u8; AEAD_KEY_LEN]>,
    /// Nonce counter value
    pub nonce: u64,
}

impl CipherStateRecord {
    /// Snapshot a live state.
    pub fn capture(state: &CipherState) -> Self {
        Self {
            cipher: state.cipher().protocol_name().to_string(),
            key: state.key_bytes().copied(),
            nonce: state.nonce(),
        }
    }

    /// Rebuild a live state, resolving the cipher name in `catalog`.
    ///
    /// # Errors
    ///
    /// `UnknownAlgorithm` if the cipher name is not registered.
    pub fn restore(&self, catalog: &AlgorithmCatalog) -> Result<CipherState, Error> {
        let cipher = catalog
            .cipher(&self.cipher)
            .ok_or_else(|| Error::UnknownAlgorithm { name: self.cipher.clone() })?;
        Ok(CipherState::from_parts(cipher, self.key, self.nonce))
    }
}

/// Snapshot of a [`SymmetricState`], including its checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymmetricStateRecord {
    /// Protocol name of the hash function (`"SHA256"`, `"SHA512"`)
    pub hash: String,
    /// Protocol name of the cipher driving the inner state
    pub cipher: String,
    /// The inner cipher state
    pub cipher_state: CipherStateRecord,
    /// Chaining key `ck`, one digest wide
    pub chaining_key: Vec<u8>,
    /// Transcript hash `h`, one digest wide
    pub transcript_hash: Vec<u8>,
    /// `ck` as of the last checkpoint
    pub checkpoint_chaining_key: Vec<u8>,
    /// `h` as of the last checkpoint
    pub checkpoint_transcript_hash: Vec<u8>,
}

impl SymmetricStateRecord {
    /// Snapshot a live state.
    pub fn capture(state: &SymmetricState) -> Self {
        Self {
            hash: state.hash_function().protocol_name().to_string(),
            cipher: state.cipher_state().cipher().protocol_name().to_string(),
            cipher_state: CipherStateRecord::capture(state.cipher_state()),
            chaining_key: state.chaining_key().to_vec(),
            transcript_hash: state.transcript_hash().to_vec(),
            checkpoint_chaining_key: state.checkpoint_chaining_key().to_vec(),
            checkpoint_transcript_hash: state.checkpoint_transcript_hash().to_vec(),
        }
    }

    /// Rebuild a live state, resolving both algorithm names in `catalog`.
    ///
    /// # Errors
    ///
    /// `UnknownAlgorithm` if either name is not registered.
    pub fn restore(&self, catalog: &AlgorithmCatalog) -> Result<SymmetricState, Error> {
        let hash = catalog
            .hash(&self.hash)
            .ok_or_else(|| Error::UnknownAlgorithm { name: self.hash.clone() })?;
        if catalog.cipher(&self.cipher).is_none() {
            return Err(Error::UnknownAlgorithm { name: self.cipher.clone() });
        }
        let cipher_state = self.cipher_state.restore(catalog)?;
        Ok(SymmetricState::from_parts(
            hash,
            cipher_state,
            self.chaining_key.clone(),
            self.transcript_hash.clone(),
            self.checkpoint_chaining_key.clone(),
            self.checkpoint_transcript_hash.clone(),
        ))
    }
}
