//! Cipher engine: plain block-mode and AEAD encryption behind one dispatch.
//!
//! The branch is fixed by [`Algorithm::mode`]:
//!
//! - [`CipherMode::Plain`]: no tag, no associated data. Integrity is provided
//!   only by the envelope's outer MAC.
//! - [`CipherMode::Aead`]: a detached tag is produced on encryption and
//!   required on decryption. Any mismatch in tag, associated data, nonce, or
//!   ciphertext fails closed and releases no plaintext.

mod authenticated;
mod block;

use common::EnvelopeError;
use thiserror::Error;

use super::matrix::{Algorithm, CipherMode};

/// Bind `$a` to the AES block cipher for `$bits` and evaluate `$body`.
macro_rules! with_aes {
    ($bits:expr, $a:ident => $body:expr) => {
        match $bits {
            $crate::crypto::matrix::KeyBits::Aes128 => {
                type $a = ::aes::Aes128;
                $body
            }
            $crate::crypto::matrix::KeyBits::Aes192 => {
                type $a = ::aes::Aes192;
                $body
            }
            $crate::crypto::matrix::KeyBits::Aes256 => {
                type $a = ::aes::Aes256;
                $body
            }
        }
    };
}

pub(crate) use with_aes;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length for the selected cipher.
    #[error("invalid key length {0} for the selected cipher")]
    InvalidKeyLength(usize),

    /// The nonce is the wrong length for the selected cipher.
    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// The configured tag length is not one the AEAD primitive supports.
    #[error("unsupported tag length {0} bytes")]
    InvalidTagLength(usize),

    /// An AEAD algorithm was asked to decrypt without a tag.
    #[error("missing authentication tag for an AEAD algorithm")]
    MissingTag,

    /// AEAD encryption failed (should be unreachable with valid lengths).
    #[error("aead encryption failed")]
    EncryptFailure,

    /// AEAD authentication failed: wrong key, or tampered tag, data, or nonce.
    #[error("aead operation failed")]
    AeadFailure,

    /// Plain-mode ciphertext did not decrypt to validly padded plaintext.
    #[error("invalid padding")]
    Padding,

    /// The CSPRNG could not produce bytes.
    #[error("random number generator failure: {0}")]
    Rng(String),
}

impl From<CipherError> for EnvelopeError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::AeadFailure => EnvelopeError::Authentication,
            CipherError::MissingTag => {
                EnvelopeError::Configuration(CipherError::MissingTag.to_string())
            }
            other => EnvelopeError::Cipher(other.to_string()),
        }
    }
}

/// Output of [`encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    /// Present exactly when the algorithm is an AEAD mode.
    pub tag: Option<Vec<u8>>,
}

/// Encrypt `plaintext`. `aad` is ignored by plain modes.
///
/// # Errors
///
/// Returns [`CipherError`] if the key, nonce, or tag length does not fit the
/// selected cipher.
pub fn encrypt(
    algorithm: Algorithm,
    tag_len: usize,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Sealed, CipherError> {
    check_nonce(algorithm, nonce)?;
    match algorithm.mode {
        CipherMode::Aead(kind) => {
            let (ciphertext, tag) =
                authenticated::seal(kind, algorithm.key_bits, tag_len, key, nonce, plaintext, aad)?;
            Ok(Sealed {
                ciphertext,
                tag: Some(tag),
            })
        }
        CipherMode::Plain(mode) => Ok(Sealed {
            ciphertext: block::encrypt(mode, algorithm.key_bits, key, nonce, plaintext)?,
            tag: None,
        }),
    }
}

/// Decrypt `ciphertext`. `tag` is required for AEAD modes; `tag` and `aad` are
/// ignored by plain modes.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if AEAD authentication fails,
/// [`CipherError::MissingTag`] if an AEAD mode gets no tag, and other
/// [`CipherError`] variants for length or padding problems.
pub fn decrypt(
    algorithm: Algorithm,
    tag_len: usize,
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: Option<&[u8]>,
    aad: &[u8],
) -> Result<Vec<u8>, CipherError> {
    check_nonce(algorithm, nonce)?;
    match algorithm.mode {
        CipherMode::Aead(kind) => {
            let tag = tag.ok_or(CipherError::MissingTag)?;
            authenticated::open(kind, algorithm.key_bits, tag_len, key, nonce, ciphertext, tag, aad)
        }
        CipherMode::Plain(mode) => block::decrypt(mode, algorithm.key_bits, key, nonce, ciphertext),
    }
}

fn check_nonce(algorithm: Algorithm, nonce: &[u8]) -> Result<(), CipherError> {
    let expected = algorithm.required_nonce_len();
    if nonce.len() != expected {
        return Err(CipherError::InvalidNonceLength {
            expected,
            actual: nonce.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::matrix::ALGORITHMS;

    const PLAINTEXT: &[u8] = b"\"123, easy as ABC. ABC, easy as 123\"";

    fn material(algorithm: Algorithm) -> (Vec<u8>, Vec<u8>) {
        let key = (0..algorithm.required_key_len()).map(|i| i as u8).collect();
        let nonce = vec![0x5a; algorithm.required_nonce_len()];
        (key, nonce)
    }

    #[test]
    fn every_algorithm_round_trips() {
        for (name, algorithm) in ALGORITHMS {
            let (key, nonce) = material(*algorithm);
            let sealed = encrypt(*algorithm, 16, &key, &nonce, PLAINTEXT, b"aad").unwrap();
            assert_eq!(sealed.tag.is_some(), algorithm.is_aead(), "{name}");
            assert_ne!(sealed.ciphertext.as_slice(), PLAINTEXT, "{name}");
            let opened = decrypt(
                *algorithm,
                16,
                &key,
                &nonce,
                &sealed.ciphertext,
                sealed.tag.as_deref(),
                b"aad",
            )
            .unwrap();
            assert_eq!(opened, PLAINTEXT, "{name}");
        }
    }

    #[test]
    fn empty_plaintext_round_trips() {
        for (name, algorithm) in ALGORITHMS {
            let (key, nonce) = material(*algorithm);
            let sealed = encrypt(*algorithm, 16, &key, &nonce, b"", b"").unwrap();
            let opened =
                decrypt(*algorithm, 16, &key, &nonce, &sealed.ciphertext, sealed.tag.as_deref(), b"")
                    .unwrap();
            assert!(opened.is_empty(), "{name}");
        }
    }

    #[test]
    fn short_tags_round_trip_for_gcm_and_ccm() {
        for name in ["aes-256-gcm", "aes-128-ccm"] {
            let algorithm: Algorithm = name.parse().unwrap();
            let (key, nonce) = material(algorithm);
            let sealed = encrypt(algorithm, 12, &key, &nonce, PLAINTEXT, b"").unwrap();
            assert_eq!(sealed.tag.as_ref().map(Vec::len), Some(12), "{name}");
            let opened =
                decrypt(algorithm, 12, &key, &nonce, &sealed.ciphertext, sealed.tag.as_deref(), b"")
                    .unwrap();
            assert_eq!(opened, PLAINTEXT);
        }
    }

    #[test]
    fn aead_rejects_tampering() {
        let algorithm: Algorithm = "aes-256-gcm".parse().unwrap();
        let (key, nonce) = material(algorithm);
        let sealed = encrypt(algorithm, 16, &key, &nonce, PLAINTEXT, b"bound").unwrap();
        let tag = sealed.tag.clone().unwrap();

        let mut bad_tag = tag.clone();
        bad_tag[0] ^= 0x01;
        assert!(matches!(
            decrypt(algorithm, 16, &key, &nonce, &sealed.ciphertext, Some(&bad_tag), b"bound"),
            Err(CipherError::AeadFailure)
        ));

        assert!(matches!(
            decrypt(algorithm, 16, &key, &nonce, &sealed.ciphertext, Some(&tag), b"other"),
            Err(CipherError::AeadFailure)
        ));

        let mut bad_ct = sealed.ciphertext.clone();
        bad_ct[0] ^= 0x80;
        assert!(matches!(
            decrypt(algorithm, 16, &key, &nonce, &bad_ct, Some(&tag), b"bound"),
            Err(CipherError::AeadFailure)
        ));

        assert!(matches!(
            decrypt(algorithm, 16, &key, &nonce, &sealed.ciphertext, Some(&tag[..8]), b"bound"),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn aead_requires_tag() {
        let algorithm: Algorithm = "aes-128-ocb".parse().unwrap();
        let (key, nonce) = material(algorithm);
        let sealed = encrypt(algorithm, 16, &key, &nonce, PLAINTEXT, b"").unwrap();
        assert!(matches!(
            decrypt(algorithm, 16, &key, &nonce, &sealed.ciphertext, None, b""),
            Err(CipherError::MissingTag)
        ));
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        let algorithm: Algorithm = "aes-256-cbc".parse().unwrap();
        let (key, nonce) = material(algorithm);
        assert!(matches!(
            encrypt(algorithm, 16, &key[..16], &nonce, PLAINTEXT, b""),
            Err(CipherError::InvalidKeyLength(16))
        ));
        assert!(matches!(
            encrypt(algorithm, 16, &key, &nonce[..12], PLAINTEXT, b""),
            Err(CipherError::InvalidNonceLength { expected: 16, actual: 12 })
        ));

        let gcm: Algorithm = "aes-256-gcm".parse().unwrap();
        let (key, nonce) = material(gcm);
        assert!(matches!(
            encrypt(gcm, 10, &key, &nonce, PLAINTEXT, b""),
            Err(CipherError::InvalidTagLength(10))
        ));
    }

    #[test]
    fn wrong_key_fails() {
        let algorithm: Algorithm = "aes-256-gcm-siv".parse().unwrap();
        let (key, nonce) = material(algorithm);
        let sealed = encrypt(algorithm, 16, &key, &nonce, PLAINTEXT, b"").unwrap();
        let other_key = vec![0xff; key.len()];
        assert!(decrypt(algorithm, 16, &other_key, &nonce, &sealed.ciphertext, sealed.tag.as_deref(), b"")
            .is_err());
    }

    #[test]
    fn aead_failure_maps_to_authentication_error() {
        assert!(matches!(
            EnvelopeError::from(CipherError::AeadFailure),
            EnvelopeError::Authentication
        ));
        assert!(matches!(
            EnvelopeError::from(CipherError::MissingTag),
            EnvelopeError::Configuration(_)
        ));
        assert!(matches!(
            EnvelopeError::from(CipherError::Padding),
            EnvelopeError::Cipher(_)
        ));
    }
}
