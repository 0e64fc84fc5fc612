//! Hash functions and the Noise HKDF
//!
//! Implements the two hash functions of the Noise specification, `SHA256`
//! and `SHA512`, each paired with the Noise key-derivation function
//! `HKDF(chaining_key, input_key_material, num_outputs)`.
//!
//! Noise HKDF is RFC 5869 extract-then-expand with the chaining key as salt
//! and empty `info`, producing two or three hash-length output blocks. The
//! implementation delegates to the `hkdf` crate; tests pin the published
//! RFC 5869 vector and cross-check the block construction against a direct
//! HMAC computation.

use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

/// A hash function usable in a Noise cipher suite.
///
/// Implementations are stateless. `hash_len` is the digest size that fixes
/// the chaining-key and transcript-hash widths of a symmetric state.
pub trait HashFunction: Send + Sync {
    /// Name of this hash function as it appears in a Noise protocol name.
    fn protocol_name(&self) -> &'static str;

    /// Digest length in bytes (32 for SHA256, 64 for SHA512).
    fn hash_len(&self) -> usize;

    /// `HASH(data)`.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// `HASH(a || b)` without materializing the concatenation.
    fn hash_two(&self, a: &[u8], b: &[u8]) -> Vec<u8>;

    /// Noise `HKDF(chaining_key, input_key_material, 2)`.
    fn hkdf2(&self, chaining_key: &[u8], ikm: &[u8])
    -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>);

    /// Noise `HKDF(chaining_key, input_key_material, 3)`.
    fn hkdf3(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
    ) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>);
}

/// SHA-256, protocol name `SHA256`, 32-byte digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hash;

/// SHA-512, protocol name `SHA512`, 64-byte digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Hash;

impl HashFunction for Sha256Hash {
    fn protocol_name(&self) -> &'static str {
        "SHA256"
    }

    fn hash_len(&self) -> usize {
        32
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn hash_two(&self, a: &[u8], b: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(a);
        hasher.update(b);
        hasher.finalize().to_vec()
    }

    fn hkdf2(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
    ) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
        let mut okm = Zeroizing::new(vec![0u8; 64]);
        let hk = Hkdf::<Sha256>::new(Some(chaining_key), ikm);
        let Ok(()) = hk.expand(&[], &mut okm) else {
            unreachable!("64 bytes is a valid HKDF-SHA256 output length");
        };
        split_two(&okm, 32)
    }

    fn hkdf3(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
    ) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
        let mut okm = Zeroizing::new(vec![0u8; 96]);
        let hk = Hkdf::<Sha256>::new(Some(chaining_key), ikm);
        let Ok(()) = hk.expand(&[], &mut okm) else {
            unreachable!("96 bytes is a valid HKDF-SHA256 output length");
        };
        split_three(&okm, 32)
    }
}

impl HashFunction for Sha512Hash {
    fn protocol_name(&self) -> &'static str {
        "SHA512"
    }

    fn hash_len(&self) -> usize {
        64
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        Sha512::digest(data).to_vec()
    }

    fn hash_two(&self, a: &[u8], b: &[u8]) -> Vec<u8> {
        let mut hasher = Sha512::new();
        hasher.update(a);
        hasher.update(b);
        hasher.finalize().to_vec()
    }

    fn hkdf2(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
    ) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
        let mut okm = Zeroizing::new(vec![0u8; 128]);
        let hk = Hkdf::<Sha512>::new(Some(chaining_key), ikm);
        let Ok(()) = hk.expand(&[], &mut okm) else {
            unreachable!("128 bytes is a valid HKDF-SHA512 output length");
        };
        split_two(&okm, 64)
    }

    fn hkdf3(
        &self,
        chaining_key: &[u8],
        ikm: &[u8],
    ) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
        let mut okm = Zeroizing::new(vec![0u8; 192]);
        let hk = Hkdf::<Sha512>::new(Some(chaining_key), ikm);
        let Ok(()) = hk.expand(&[], &mut okm) else {
            unreachable!("192 bytes is a valid HKDF-SHA512 output length");
        };
        split_three(&okm, 64)
    }
}

fn split_two(okm: &[u8], len: usize) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
    (
        Zeroizing::new(okm[..len].to_vec()),
        Zeroizing::new(okm[len..2 * len].to_vec()),
    )
}

fn split_three(
    okm: &[u8],
    len: usize,
) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
    (
        Zeroizing::new(okm[..len].to_vec()),
        Zeroizing::new(okm[len..2 * len].to_vec()),
        Zeroizing::new(okm[2 * len..3 * len].to_vec()),
    )
}
