//! Common error types shared across crates.

use thiserror::Error;

/// Top-level envelope error type.
///
/// Every failure is terminal for the call that produced it: no plaintext and
/// no partial ciphertext is ever returned alongside an error.
///
/// Variants map to process exit codes used by the command-line front end:
/// - [`EnvelopeError::Configuration`] → 2
/// - [`EnvelopeError::Parse`] → 3
/// - [`EnvelopeError::Tampered`] / [`EnvelopeError::Authentication`] → 4
/// - everything else → 1
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Missing secret, unknown algorithm or hash, or an unusable explicit size.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The key-stretching primitive rejected its input.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The cipher primitive rejected a key, nonce, or tag, or the RNG failed.
    #[error("cipher failure: {0}")]
    Cipher(String),

    /// The serialized record, one of its fields, or the decrypted payload is malformed.
    #[error("malformed envelope: {0}")]
    Parse(String),

    /// The outer MAC did not match the ciphertext. Decryption was not attempted.
    #[error("envelope was tampered with")]
    Tampered,

    /// The AEAD tag or associated data did not authenticate.
    #[error("envelope failed authentication")]
    Authentication,

    /// The caller's payload could not be serialized.
    #[error("payload serialisation failed: {0}")]
    Payload(String),
}

impl EnvelopeError {
    /// Short machine-readable error code (e.g. `"tampered"`).
    pub fn code(&self) -> &'static str {
        match self {
            EnvelopeError::Configuration(_) => "configuration",
            EnvelopeError::KeyDerivation(_) => "key_derivation",
            EnvelopeError::Cipher(_) => "cipher",
            EnvelopeError::Parse(_) => "parse",
            EnvelopeError::Tampered => "tampered",
            EnvelopeError::Authentication => "authentication",
            EnvelopeError::Payload(_) => "payload",
        }
    }

    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EnvelopeError::Configuration(_) => 2,
            EnvelopeError::Parse(_) => 3,
            EnvelopeError::Tampered | EnvelopeError::Authentication => 4,
            EnvelopeError::KeyDerivation(_)
            | EnvelopeError::Cipher(_)
            | EnvelopeError::Payload(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(EnvelopeError::Configuration("x".into()).exit_code(), 2);
        assert_eq!(EnvelopeError::Parse("x".into()).exit_code(), 3);
        assert_eq!(EnvelopeError::Tampered.exit_code(), 4);
        assert_eq!(EnvelopeError::Authentication.exit_code(), 4);
        assert_eq!(EnvelopeError::Cipher("x".into()).exit_code(), 1);
        assert_eq!(EnvelopeError::KeyDerivation("x".into()).exit_code(), 1);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            EnvelopeError::Configuration("x".into()),
            EnvelopeError::KeyDerivation("x".into()),
            EnvelopeError::Cipher("x".into()),
            EnvelopeError::Parse("x".into()),
            EnvelopeError::Tampered,
            EnvelopeError::Authentication,
            EnvelopeError::Payload("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(EnvelopeError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn display_includes_message() {
        let e = EnvelopeError::Configuration("must supply a secret".into());
        assert!(e.to_string().contains("must supply a secret"));
    }
}
