//! Name-to-algorithm capability table
//!
//! Maps Noise protocol-name fragments (`ChaChaPoly`, `SHA256`, ...) to the
//! implementations behind them. A catalog is built once at startup —
//! [`AlgorithmCatalog::with_defaults`] plus any extension registrations —
//! and then passed by shared reference wherever names must be resolved,
//! chiefly when decoding persisted state. Registration after concurrent use
//! begins is not supported; callers keep the catalog immutable once built.

use std::sync::Arc;

use crate::aead::{AesGcmCipher, ChaChaPolyCipher, CipherAlgorithm};
use crate::error::CryptoError;
use crate::hash::{HashFunction, Sha256Hash, Sha512Hash};

/// Table of registered cipher and hash implementations, keyed by their
/// protocol names.
pub struct AlgorithmCatalog {
    ciphers: Vec<Arc<dyn CipherAlgorithm>>,
    hashes: Vec<Arc<dyn HashFunction>>,
}

impl AlgorithmCatalog {
    /// An empty catalog with no algorithms registered.
    pub fn empty() -> Self {
        Self { ciphers: Vec::new(), hashes: Vec::new() }
    }

    /// A catalog holding the built-in algorithms: `ChaChaPoly`, `AESGCM`,
    /// `SHA256`, and `SHA512`.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::empty();
        let Ok(()) = catalog.register_cipher(Arc::new(ChaChaPolyCipher)) else {
            unreachable!("empty catalog cannot hold a duplicate");
        };
        let Ok(()) = catalog.register_cipher(Arc::new(AesGcmCipher)) else {
            unreachable!("empty catalog cannot hold a duplicate");
        };
        let Ok(()) = catalog.register_hash(Arc::new(Sha256Hash)) else {
            unreachable!("empty catalog cannot hold a duplicate");
        };
        let Ok(()) = catalog.register_hash(Arc::new(Sha512Hash)) else {
            unreachable!("empty catalog cannot hold a duplicate");
        };
        catalog
    }

    /// Register an additional cipher implementation.
    ///
    /// # Errors
    ///
    /// `DuplicateAlgorithm` if a cipher with the same protocol name is
    /// already present.
    pub fn register_cipher(&mut self, cipher: Arc<dyn CipherAlgorithm>) -> Result<(), CryptoError> {
        if self.cipher(cipher.protocol_name()).is_some() {
            return Err(CryptoError::DuplicateAlgorithm {
                name: cipher.protocol_name().to_string(),
            });
        }
        self.ciphers.push(cipher);
        Ok(())
    }

    /// Register an additional hash implementation.
    ///
    /// # Errors
    ///
    /// `DuplicateAlgorithm` if a hash with the same protocol name is already
    /// present.
    pub fn register_hash(&mut self, hash: Arc<dyn HashFunction>) -> Result<(), CryptoError> {
        if self.hash(hash.protocol_name()).is_some() {
            return Err(CryptoError::DuplicateAlgorithm {
                name: hash.protocol_name().to_string(),
            });
        }
        self.hashes.push(hash);
        Ok(())
    }

    /// Look up a cipher by protocol name.
    pub fn cipher(&self, name: &str) -> Option<Arc<dyn CipherAlgorithm>> {
        self.ciphers.iter().find(|c| c.protocol_name() == name).cloned()
    }

    /// Look up a hash function by protocol name.
    pub fn hash(&self, name: &str) -> Option<Arc<dyn HashFunction>> {
        self.hashes.iter().find(|h| h.protocol_name() == name).cloned()
    }

    /// Protocol names of all registered ciphers, in registration order.
    pub fn cipher_names(&self) -> Vec<&'static str> {
        self.ciphers.iter().map(|c| c.protocol_name()).collect()
    }

    /// Protocol names of all registered hash functions, in registration
    /// order.
    pub fn hash_names(&self) -> Vec<&'static str> {
        self.hashes.iter().map(|h| h.protocol_name()).collect()
    }
}

impl Default for AlgorithmCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}
