//! Hash and HMAC primitives, dispatched over the configured hash family.
//!
//! Outer-MAC checks must go through [`verify`], which compares in constant
//! time. Never compare the output of [`compute`] with `==` for tamper detection.

use std::fmt;
use std::str::FromStr;

use common::EnvelopeError;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Digest;

/// Hash functions usable for the outer MAC, associated data, and key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

/// Identifier used when none is configured.
pub const DEFAULT_HASH: &str = "sha512";

/// Bind `$d` to the concrete digest type for `$hash` and evaluate `$body`.
macro_rules! with_digest {
    ($hash:expr, $d:ident => $body:expr) => {
        match $hash {
            $crate::crypto::mac::HashAlgorithm::Sha224 => {
                type $d = ::sha2::Sha224;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha256 => {
                type $d = ::sha2::Sha256;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha384 => {
                type $d = ::sha2::Sha384;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha512 => {
                type $d = ::sha2::Sha512;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha512_224 => {
                type $d = ::sha2::Sha512_224;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha512_256 => {
                type $d = ::sha2::Sha512_256;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha3_224 => {
                type $d = ::sha3::Sha3_224;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha3_256 => {
                type $d = ::sha3::Sha3_256;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha3_384 => {
                type $d = ::sha3::Sha3_384;
                $body
            }
            $crate::crypto::mac::HashAlgorithm::Sha3_512 => {
                type $d = ::sha3::Sha3_512;
                $body
            }
        }
    };
}

pub(crate) use with_digest;

const NAMES: &[(&str, HashAlgorithm)] = &[
    ("sha224", HashAlgorithm::Sha224),
    ("sha256", HashAlgorithm::Sha256),
    ("sha384", HashAlgorithm::Sha384),
    ("sha512", HashAlgorithm::Sha512),
    ("sha512-224", HashAlgorithm::Sha512_224),
    ("sha512-256", HashAlgorithm::Sha512_256),
    ("sha3-224", HashAlgorithm::Sha3_224),
    ("sha3-256", HashAlgorithm::Sha3_256),
    ("sha3-384", HashAlgorithm::Sha3_384),
    ("sha3-512", HashAlgorithm::Sha3_512),
];

impl HashAlgorithm {
    /// Every supported hash, in table order.
    pub fn all() -> impl Iterator<Item = HashAlgorithm> {
        NAMES.iter().map(|(_, hash)| *hash)
    }

    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, hash)| *hash == self)
            .map_or("unlisted", |(name, _)| *name)
    }
}

impl FromStr for HashAlgorithm {
    type Err = EnvelopeError;

    /// Accepts `sha512`, `SHA-512`, `sha512_256`, `sha3-256`, and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        if let Some(rest) = wanted.strip_prefix("sha-") {
            wanted = format!("sha{rest}");
        }
        NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, hash)| *hash)
            .ok_or_else(|| EnvelopeError::Configuration(format!("unsupported hash {s:?}")))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Plain (unkeyed) digest of `data`.
pub fn digest(hash: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    with_digest!(hash, D => <D as Digest>::digest(data).to_vec())
}

/// HMAC of `message` under `key`.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the HMAC primitive rejects the key.
pub fn compute(hash: HashAlgorithm, key: &[u8], message: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    with_digest!(hash, D => {
        let mut mac = <Hmac<D> as Mac>::new_from_slice(key)?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().to_vec())
    })
}

/// Recompute the HMAC of `message` and compare it to `expected` in constant time.
///
/// # Errors
///
/// Returns [`InvalidLength`] if the HMAC primitive rejects the key.
pub fn verify(
    hash: HashAlgorithm,
    key: &[u8],
    message: &[u8],
    expected: &[u8],
) -> Result<bool, InvalidLength> {
    with_digest!(hash, D => {
        let mut mac = <Hmac<D> as Mac>::new_from_slice(key)?;
        mac.update(message);
        Ok(mac.verify_slice(expected).is_ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("sha512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha512_256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512_256);
        assert_eq!("sha3-384".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha3_384);
    }

    #[test]
    fn rejects_unknown_hash() {
        assert!(matches!(
            "w00t".parse::<HashAlgorithm>(),
            Err(EnvelopeError::Configuration(_))
        ));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn output_lengths() {
        let expected = [28, 32, 48, 64, 28, 32, 28, 32, 48, 64];
        for (hash, len) in HashAlgorithm::all().zip(expected) {
            assert_eq!(digest(hash, b"abc").len(), len, "{hash}");
            assert_eq!(compute(hash, b"k", b"abc").unwrap().len(), len, "{hash}");
        }
    }

    #[test]
    fn hmac_sha256_rfc4231_case_2() {
        let tag = compute(
            HashAlgorithm::Sha256,
            b"Jefe",
            b"what do ya want for nothing?",
        )
        .unwrap();
        assert_eq!(
            tag,
            [
                0x5b, 0xdc, 0xc1, 0x46, 0xbf, 0x60, 0x75, 0x4e, 0x6a, 0x04, 0x24, 0x26, 0x08,
                0x95, 0x75, 0xc7, 0x5a, 0x00, 0x3f, 0x08, 0x9d, 0x27, 0x39, 0x83, 0x9d, 0xec,
                0x58, 0xb9, 0x64, 0xec, 0x38, 0x43,
            ]
        );
    }

    #[test]
    fn verify_accepts_matching_and_rejects_flipped() {
        let key = b"derived-key";
        let mut tag = compute(HashAlgorithm::Sha512, key, b"ciphertext").unwrap();
        assert!(verify(HashAlgorithm::Sha512, key, b"ciphertext", &tag).unwrap());
        tag[10] ^= 0x01;
        assert!(!verify(HashAlgorithm::Sha512, key, b"ciphertext", &tag).unwrap());
        assert!(!verify(HashAlgorithm::Sha512, key, b"ciphertext", &tag[..32]).unwrap());
    }

    #[test]
    fn different_keys_give_different_tags() {
        let a = compute(HashAlgorithm::Sha3_512, b"key-a", b"msg").unwrap();
        let b = compute(HashAlgorithm::Sha3_512, b"key-b", b"msg").unwrap();
        assert_ne!(a, b);
    }
}
