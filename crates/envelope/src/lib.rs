//! Symmetric authenticated-encryption envelopes.
//!
//! An [`Envelope`] derives a key from a secret once, then seals serializable
//! payloads into self-describing JSON records and opens them again. Every
//! record carries an outer HMAC over the ciphertext that is checked before
//! decryption; AEAD algorithms additionally carry a detached tag.
//!
//! ```no_run
//! use envelope::{Envelope, EnvelopeOptions};
//!
//! # fn main() -> Result<(), envelope::EnvelopeError> {
//! let envelope = Envelope::new(EnvelopeOptions::new("squirrel"))?;
//! let sealed = envelope.seal("hello")?;
//! let opened: String = envelope.open(&sealed)?;
//! assert_eq!(opened, "hello");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod envelope;

pub use common::{Encoding, EnvelopeError, ErrorReport, Record};
pub use self::config::EnvelopeOptions;
pub use crypto::{Algorithm, CryptoBackend, HashAlgorithm, KeyStretch, RustCrypto, Sizes};
pub use envelope::Envelope;
