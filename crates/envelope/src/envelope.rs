//! The envelope codec: payload in, self-describing sealed record out.
//!
//! Sealing:
//!
//! ```text
//! plaintext = json(payload)
//! nonce     = random(nonce_len)
//! aad       = hmac(nonce || key, plaintext)           AEAD modes only
//! ct, tag   = encrypt(key, nonce, plaintext, aad)
//! mac       = hmac(key, ct)
//! ```
//!
//! Opening checks `mac` in constant time before any decryption is attempted.
//!
//! `mac` covers the ciphertext only. AEAD modes bind the nonce through the
//! tag, but plain-mode nonces are unauthenticated: flipping a CBC IV bit
//! flips the same bit of the first plaintext block and still opens cleanly.

use std::fmt;
use std::sync::Arc;

use common::{Encoding, EnvelopeError, Record};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::EnvelopeOptions;
use crate::crypto::backend::{CryptoBackend, RustCrypto};
use crate::crypto::cipher::CipherError;
use crate::crypto::kdf::{self, DerivedKey};
use crate::crypto::mac::HashAlgorithm;
use crate::crypto::matrix::{Algorithm, Sizes};
use crate::crypto::nonce;

/// A configured envelope. Cheap to clone; safe to share across threads.
#[derive(Clone)]
pub struct Envelope {
    inner: Arc<Inner>,
}

struct Inner {
    algorithm: Algorithm,
    hash: HashAlgorithm,
    encoding: Encoding,
    sizes: Sizes,
    key: DerivedKey,
    backend: Arc<dyn CryptoBackend>,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("algorithm", &self.inner.algorithm)
            .field("hash", &self.inner.hash)
            .field("encoding", &self.inner.encoding)
            .field("sizes", &self.inner.sizes)
            .field("key", &self.inner.key)
            .finish_non_exhaustive()
    }
}

impl Envelope {
    /// Build an envelope on the default RustCrypto backend.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] for invalid options and
    /// [`EnvelopeError::KeyDerivation`] if the key cannot be derived.
    pub fn new(options: EnvelopeOptions) -> Result<Self, EnvelopeError> {
        Self::with_backend(options, Arc::new(RustCrypto))
    }

    /// Build an envelope on an explicit crypto backend.
    ///
    /// # Errors
    ///
    /// Same as [`Envelope::new`].
    pub fn with_backend(
        options: EnvelopeOptions,
        backend: Arc<dyn CryptoBackend>,
    ) -> Result<Self, EnvelopeError> {
        let (algorithm, hash) = options.resolve()?;
        let sizes = algorithm.resolve_sizes(options.tag_size, options.nonce_size, options.key_size)?;
        let key = kdf::derive_key(
            backend.as_ref(),
            options.key_stretch,
            hash,
            options.secret.as_bytes(),
            sizes.key_len,
        )?;

        debug!(
            algorithm = %algorithm,
            hash = %hash,
            encoding = ?options.encoding,
            key_stretch = %options.key_stretch,
            tag_bits = sizes.tag_bits,
            nonce_len = sizes.nonce_len,
            key_len = sizes.key_len,
            "envelope configured"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                algorithm,
                hash,
                encoding: options.encoding,
                sizes,
                key,
                backend,
            }),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.inner.algorithm
    }

    /// Resolved tag, nonce and key sizes.
    pub fn sizes(&self) -> Sizes {
        self.inner.sizes
    }

    /// Serialize `payload` to JSON and seal it into a record.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Payload`] if the payload cannot be serialized
    /// and [`EnvelopeError::Cipher`] if nonce generation or encryption fails.
    pub fn seal<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, EnvelopeError> {
        let inner = &*self.inner;
        let plaintext = Zeroizing::new(
            serde_json::to_vec(payload).map_err(|e| EnvelopeError::Payload(e.to_string()))?,
        );
        let nonce = nonce::generate(inner.backend.as_ref(), inner.sizes.nonce_len)?;

        let aad = if inner.algorithm.is_aead() {
            Some(self.associated_data(&nonce, &plaintext)?)
        } else {
            None
        };

        let sealed = inner.backend.encrypt(
            inner.algorithm,
            inner.sizes.tag_len(),
            inner.key.as_bytes(),
            &nonce,
            &plaintext,
            aad.as_deref().unwrap_or_default(),
        )?;
        let mac = inner
            .backend
            .hmac(inner.hash, inner.key.as_bytes(), &sealed.ciphertext)
            .map_err(mac_key_rejected)?;

        let encoding = inner.encoding;
        Record {
            ciphertext: encoding.encode(&sealed.ciphertext),
            nonce: encoding.encode(&nonce),
            mac: encoding.encode(&mac),
            tag: sealed.tag.map(|tag| encoding.encode(&tag)),
            associated_data: aad.map(|aad| encoding.encode(&aad)),
        }
        .to_json()
    }

    /// Verify and decrypt a record produced by [`Envelope::seal`].
    ///
    /// # Errors
    ///
    /// - [`EnvelopeError::Parse`]: malformed record, field, or payload.
    /// - [`EnvelopeError::Tampered`]: the outer MAC does not match. Nothing is
    ///   decrypted.
    /// - [`EnvelopeError::Authentication`]: the AEAD tag does not verify.
    /// - [`EnvelopeError::Configuration`]: an AEAD record without a tag.
    /// - [`EnvelopeError::Cipher`]: any other cipher rejection.
    pub fn open<T: DeserializeOwned>(&self, text: &str) -> Result<T, EnvelopeError> {
        let inner = &*self.inner;
        let encoding = inner.encoding;
        let record = Record::from_json(text)?;
        let ciphertext = encoding.decode(&record.ciphertext)?;
        let nonce = encoding.decode(&record.nonce)?;

        let mac = encoding.decode(&record.mac).map_err(|_| {
            warn!(algorithm = %inner.algorithm, "undecodable envelope mac");
            EnvelopeError::Tampered
        })?;
        let intact = inner
            .backend
            .verify_hmac(inner.hash, inner.key.as_bytes(), &ciphertext, &mac)
            .map_err(mac_key_rejected)?;
        if !intact {
            warn!(algorithm = %inner.algorithm, "envelope mac mismatch");
            return Err(EnvelopeError::Tampered);
        }

        let tag = record
            .tag
            .as_deref()
            .map(|tag| encoding.decode(tag))
            .transpose()?;
        let aad = record
            .associated_data
            .as_deref()
            .map(|aad| encoding.decode(aad))
            .transpose()?;

        let plaintext = inner
            .backend
            .decrypt(
                inner.algorithm,
                inner.sizes.tag_len(),
                inner.key.as_bytes(),
                &nonce,
                &ciphertext,
                tag.as_deref(),
                aad.as_deref().unwrap_or_default(),
            )
            .map_err(|e| {
                if matches!(e, CipherError::AeadFailure) {
                    warn!(algorithm = %inner.algorithm, "envelope failed authentication");
                }
                EnvelopeError::from(e)
            })?;
        let plaintext = Zeroizing::new(plaintext);

        serde_json::from_slice(&plaintext)
            .map_err(|e| EnvelopeError::Parse(format!("unable to parse payload: {e}")))
    }

    /// `hmac(nonce || key, plaintext)`.
    fn associated_data(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let inner = &*self.inner;
        let mut mac_key = Zeroizing::new(Vec::with_capacity(nonce.len() + inner.key.len()));
        mac_key.extend_from_slice(nonce);
        mac_key.extend_from_slice(inner.key.as_bytes());
        inner
            .backend
            .hmac(inner.hash, &mac_key, plaintext)
            .map_err(mac_key_rejected)
    }
}

fn mac_key_rejected(e: hmac::digest::InvalidLength) -> EnvelopeError {
    EnvelopeError::Cipher(format!("mac key rejected: {e}"))
}
