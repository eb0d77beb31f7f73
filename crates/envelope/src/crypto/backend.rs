//! Pluggable crypto provider.
//!
//! The envelope never calls primitive crates directly; it goes through a
//! [`CryptoBackend`]. Only randomness must be supplied by an implementation.
//! Every other operation has a default that runs the RustCrypto primitives,
//! so a test double can override one method and inherit the rest.

use aead::rand_core::RngCore;
use aead::OsRng;
use hmac::digest::InvalidLength;

use super::cipher::{self, CipherError, Sealed};
use super::kdf::{self, KdfError, KeyStretch};
use super::mac::{self, HashAlgorithm};
use super::matrix::Algorithm;

/// Capabilities the envelope needs from its crypto provider.
pub trait CryptoBackend: Send + Sync {
    /// Fill `buf` from a cryptographically secure RNG.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CipherError>;

    fn digest(&self, hash: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        mac::digest(hash, data)
    }

    fn hmac(&self, hash: HashAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InvalidLength> {
        mac::compute(hash, key, message)
    }

    /// Constant-time HMAC check.
    fn verify_hmac(
        &self,
        hash: HashAlgorithm,
        key: &[u8],
        message: &[u8],
        expected: &[u8],
    ) -> Result<bool, InvalidLength> {
        mac::verify(hash, key, message, expected)
    }

    fn stretch(
        &self,
        stretch: KeyStretch,
        hash: HashAlgorithm,
        secret: &[u8],
        salt: &[u8],
        out: &mut [u8],
    ) -> Result<(), KdfError> {
        kdf::stretch(stretch, hash, secret, salt, out)
    }

    fn encrypt(
        &self,
        algorithm: Algorithm,
        tag_len: usize,
        key: &[u8],
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Sealed, CipherError> {
        cipher::encrypt(algorithm, tag_len, key, nonce, plaintext, aad)
    }

    #[allow(clippy::too_many_arguments)]
    fn decrypt(
        &self,
        algorithm: Algorithm,
        tag_len: usize,
        key: &[u8],
        nonce: &[u8],
        ciphertext: &[u8],
        tag: Option<&[u8]>,
        aad: &[u8],
    ) -> Result<Vec<u8>, CipherError> {
        cipher::decrypt(algorithm, tag_len, key, nonce, ciphertext, tag, aad)
    }
}

/// Default backend: RustCrypto primitives with the operating-system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCrypto;

impl CryptoBackend for RustCrypto {
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), CipherError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CipherError::Rng(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_requested_bytes() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        RustCrypto.fill_random(&mut a).unwrap();
        RustCrypto.fill_random(&mut b).unwrap();
        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn defaults_delegate_to_primitives() {
        let backend = RustCrypto;
        assert_eq!(
            backend.digest(HashAlgorithm::Sha256, b"abc"),
            mac::digest(HashAlgorithm::Sha256, b"abc")
        );
        let tag = backend.hmac(HashAlgorithm::Sha256, b"k", b"m").unwrap();
        assert!(backend.verify_hmac(HashAlgorithm::Sha256, b"k", b"m", &tag).unwrap());
    }
}
