//! Envelope options and layered loading.
//!
//! Options can be built in code with [`EnvelopeOptions::new`] and the setters,
//! or loaded from an optional TOML/JSON file overlaid with `ENVELOPE_*`
//! environment variables (`ENVELOPE_SECRET`, `ENVELOPE_ALGORITHM`,
//! `ENVELOPE_KEY_STRETCH`, ...).

use std::fmt;
use std::path::Path;

use common::{Encoding, EnvelopeError};
use serde::Deserialize;
use zeroize::Zeroize;

use crate::crypto::kdf::KeyStretch;
use crate::crypto::mac::{HashAlgorithm, DEFAULT_HASH};
use crate::crypto::matrix::{Algorithm, DEFAULT_ALGORITHM};

/// Settings for an [`Envelope`](crate::Envelope).
#[derive(Clone, Deserialize)]
pub struct EnvelopeOptions {
    /// Secret the key is derived from. **Required.**
    #[serde(default)]
    pub secret: String,

    /// Algorithm identifier, e.g. `aes-256-gcm`.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Hash used for the MAC, the associated data and key derivation.
    #[serde(default = "default_hashing")]
    pub hashing: String,

    /// Rendering of byte fields in sealed records.
    #[serde(default)]
    pub encoding: Encoding,

    /// Key-stretching function.
    #[serde(default)]
    pub key_stretch: KeyStretch,

    /// Tag length override, in bits.
    #[serde(default)]
    pub tag_size: Option<u32>,

    /// Nonce length override, in bytes.
    #[serde(default)]
    pub nonce_size: Option<usize>,

    /// Key length override, in bytes.
    #[serde(default)]
    pub key_size: Option<usize>,

    /// Permit modes that leak plaintext structure (ECB).
    #[serde(default)]
    pub allow_insecure: bool,
}

fn default_algorithm() -> String {
    DEFAULT_ALGORITHM.into()
}
fn default_hashing() -> String {
    DEFAULT_HASH.into()
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: default_algorithm(),
            hashing: default_hashing(),
            encoding: Encoding::default(),
            key_stretch: KeyStretch::default(),
            tag_size: None,
            nonce_size: None,
            key_size: None,
            allow_insecure: false,
        }
    }
}

impl Drop for EnvelopeOptions {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl fmt::Debug for EnvelopeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeOptions")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("hashing", &self.hashing)
            .field("encoding", &self.encoding)
            .field("key_stretch", &self.key_stretch)
            .field("tag_size", &self.tag_size)
            .field("nonce_size", &self.nonce_size)
            .field("key_size", &self.key_size)
            .field("allow_insecure", &self.allow_insecure)
            .finish()
    }
}

impl EnvelopeOptions {
    /// Default options with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        let mut options = Self::default();
        options.secret = secret.into();
        options
    }

    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn hashing(mut self, hashing: impl Into<String>) -> Self {
        self.hashing = hashing.into();
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn key_stretch(mut self, key_stretch: KeyStretch) -> Self {
        self.key_stretch = key_stretch;
        self
    }

    pub fn tag_size(mut self, bits: u32) -> Self {
        self.tag_size = Some(bits);
        self
    }

    pub fn nonce_size(mut self, bytes: usize) -> Self {
        self.nonce_size = Some(bytes);
        self
    }

    pub fn key_size(mut self, bytes: usize) -> Self {
        self.key_size = Some(bytes);
        self
    }

    pub fn allow_insecure(mut self, allow: bool) -> Self {
        self.allow_insecure = allow;
        self
    }

    /// Load options from `file` (if given) overlaid with `ENVELOPE_*`
    /// environment variables, then validate them.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] if the file cannot be read, a
    /// value has the wrong type, or validation fails.
    pub fn load(file: Option<&Path>) -> Result<Self, EnvelopeError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let cfg = builder
            .add_source(config::Environment::with_prefix("ENVELOPE"))
            .build()
            .map_err(|e| EnvelopeError::Configuration(format!("failed to load options: {e}")))?;

        let options: EnvelopeOptions = cfg.try_deserialize().map_err(|e| {
            EnvelopeError::Configuration(format!("failed to deserialise options: {e}"))
        })?;

        options.validate()?;
        Ok(options)
    }

    /// Check that the options describe a usable envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] on the first problem found.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let (algorithm, _) = self.resolve()?;
        algorithm.resolve_sizes(self.tag_size, self.nonce_size, self.key_size)?;
        Ok(())
    }

    /// Parse the algorithm and hash identifiers and apply the insecure-mode gate.
    pub(crate) fn resolve(&self) -> Result<(Algorithm, HashAlgorithm), EnvelopeError> {
        if self.secret.is_empty() {
            return Err(EnvelopeError::Configuration("must supply a secret".into()));
        }
        let algorithm: Algorithm = self.algorithm.parse()?;
        let hash: HashAlgorithm = self.hashing.parse()?;
        if algorithm.is_insecure() && !self.allow_insecure {
            return Err(EnvelopeError::Configuration(format!(
                "insecure cipher mode {algorithm} requires allow_insecure"
            )));
        }
        Ok((algorithm, hash))
    }
}
