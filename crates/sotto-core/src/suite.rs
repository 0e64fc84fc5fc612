//! Cipher suite selection
//!
//! A [`CipherSuite`] fixes the three primitive choices of a Noise protocol:
//! the DH curve, the AEAD cipher, and the hash function. The suite is chosen
//! at handshake construction and never changes afterwards; both parties must
//! agree on it out of band, since the full protocol name is mixed into the
//! transcript hash and any disagreement fails the first authenticated
//! message.

use std::sync::Arc;

use sotto_crypto::{
    AesGcmCipher, ChaChaPolyCipher, CipherAlgorithm, HashFunction, Sha256Hash, Sha512Hash,
};

/// The Diffie-Hellman curve of a suite.
///
/// Only Curve25519 is implemented; the enum leaves room for additional
/// curves without changing the suite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCurve {
    /// X25519 (Curve25519 with the RFC 7748 function)
    Curve25519,
}

impl KeyCurve {
    /// Curve name as it appears in a protocol name.
    pub fn protocol_name(self) -> &'static str {
        match self {
            Self::Curve25519 => "25519",
        }
    }
}

/// An immutable triple of primitive choices.
#[derive(Clone)]
pub struct CipherSuite {
    curve: KeyCurve,
    cipher: Arc<dyn CipherAlgorithm>,
    hash: Arc<dyn HashFunction>,
}

impl CipherSuite {
    /// Assemble a suite from its parts.
    pub fn new(curve: KeyCurve, cipher: Arc<dyn CipherAlgorithm>, hash: Arc<dyn HashFunction>) -> Self {
        Self { curve, cipher, hash }
    }

    /// `Noise_*_25519_ChaChaPoly_SHA256`: the most common default.
    pub fn chachapoly_sha256() -> Self {
        Self::new(KeyCurve::Curve25519, Arc::new(ChaChaPolyCipher), Arc::new(Sha256Hash))
    }

    /// `Noise_*_25519_ChaChaPoly_SHA512`.
    pub fn chachapoly_sha512() -> Self {
        Self::new(KeyCurve::Curve25519, Arc::new(ChaChaPolyCipher), Arc::new(Sha512Hash))
    }

    /// `Noise_*_25519_AESGCM_SHA256`.
    pub fn aesgcm_sha256() -> Self {
        Self::new(KeyCurve::Curve25519, Arc::new(AesGcmCipher), Arc::new(Sha256Hash))
    }

    /// `Noise_*_25519_AESGCM_SHA512`.
    pub fn aesgcm_sha512() -> Self {
        Self::new(KeyCurve::Curve25519, Arc::new(AesGcmCipher), Arc::new(Sha512Hash))
    }

    /// The DH curve.
    pub fn curve(&self) -> KeyCurve {
        self.curve
    }

    /// The AEAD cipher.
    pub fn cipher(&self) -> &Arc<dyn CipherAlgorithm> {
        &self.cipher
    }

    /// The hash function.
    pub fn hash(&self) -> &Arc<dyn HashFunction> {
        &self.hash
    }

    /// Suite name fragment: `"<curve>_<cipher>_<hash>"`.
    pub fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.curve.protocol_name(),
            self.cipher.protocol_name(),
            self.hash.protocol_name()
        )
    }
}

impl core::fmt::Debug for CipherSuite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CipherSuite").field("name", &self.name()).finish()
    }
}
