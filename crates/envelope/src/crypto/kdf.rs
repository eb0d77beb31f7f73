//! Key derivation: secret → salted, stretched, truncated key.
//!
//! ```text
//! salt = hash(secret)[..16]
//! key  = stretch(secret, salt, 64 bytes)[..key_len]
//! ```
//!
//! The salt is derived from the secret itself, so derivation is deterministic
//! for a given (secret, hash, stretch, key length). It exists to separate
//! hash families, not to defeat precomputation.

use std::fmt;

use common::EnvelopeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroize;

use super::backend::CryptoBackend;
use super::mac::{with_digest, HashAlgorithm};

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 10_000;

/// scrypt cost parameters: N = 2^14, r = 8, p = 1.
pub const SCRYPT_LOG_N: u8 = 14;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;

/// Length of the stretched output before truncation.
pub const STRETCHED_LEN: usize = 64;

/// Number of digest bytes used as salt.
pub const SALT_LEN: usize = 16;

/// Errors produced by the key-derivation layer.
#[derive(Debug, Error)]
pub enum KdfError {
    /// No secret material was supplied.
    #[error("must supply a secret")]
    EmptySecret,

    /// The requested key is longer than the stretched output, or empty.
    #[error("invalid key length {0}: must be between 1 and {STRETCHED_LEN} bytes")]
    InvalidKeyLength(usize),

    /// The stretching primitive rejected its parameters.
    #[error("unable to derive key: {0}")]
    Stretch(String),
}

impl From<KdfError> for EnvelopeError {
    fn from(e: KdfError) -> Self {
        EnvelopeError::KeyDerivation(e.to_string())
    }
}

/// Key-stretching function applied after salting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStretch {
    /// PBKDF2-HMAC over the configured hash.
    #[default]
    Pbkdf2,
    /// scrypt (internally SHA-256; the configured hash still produces the salt).
    Scrypt,
}

impl fmt::Display for KeyStretch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStretch::Pbkdf2 => f.write_str("pbkdf2"),
            KeyStretch::Scrypt => f.write_str("scrypt"),
        }
    }
}

/// Derived key material.
///
/// Zeroized on drop; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKey {
    bytes: Vec<u8>,
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a `key_len`-byte key from `secret`.
///
/// # Errors
///
/// Returns [`KdfError::EmptySecret`] for an empty secret,
/// [`KdfError::InvalidKeyLength`] if `key_len` is 0 or exceeds
/// [`STRETCHED_LEN`], and [`KdfError::Stretch`] if the primitive fails.
pub fn derive_key(
    backend: &dyn CryptoBackend,
    stretch: KeyStretch,
    hash: HashAlgorithm,
    secret: &[u8],
    key_len: usize,
) -> Result<DerivedKey, KdfError> {
    if secret.is_empty() {
        return Err(KdfError::EmptySecret);
    }
    if key_len == 0 || key_len > STRETCHED_LEN {
        return Err(KdfError::InvalidKeyLength(key_len));
    }

    let mut salt = backend.digest(hash, secret);
    salt.truncate(SALT_LEN);

    let mut stretched = vec![0u8; STRETCHED_LEN];
    let result = backend.stretch(stretch, hash, secret, &salt, &mut stretched);
    salt.zeroize();
    if let Err(e) = result {
        stretched.zeroize();
        return Err(e);
    }

    stretched.truncate(key_len);
    Ok(DerivedKey { bytes: stretched })
}

/// Run the stretching primitive, filling `out` entirely.
///
/// # Errors
///
/// Returns [`KdfError::Stretch`] if the primitive rejects its parameters.
pub fn stretch(
    stretch: KeyStretch,
    hash: HashAlgorithm,
    secret: &[u8],
    salt: &[u8],
    out: &mut [u8],
) -> Result<(), KdfError> {
    match stretch {
        KeyStretch::Pbkdf2 => {
            with_digest!(hash, D => pbkdf2::pbkdf2_hmac::<D>(secret, salt, PBKDF2_ROUNDS, out));
            Ok(())
        }
        KeyStretch::Scrypt => {
            let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, out.len())
                .map_err(|e| KdfError::Stretch(e.to_string()))?;
            scrypt::scrypt(secret, salt, &params, out).map_err(|e| KdfError::Stretch(e.to_string()))
        }
    }
}
