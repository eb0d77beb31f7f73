//! Wire types exchanged with callers.
//!
//! A sealed envelope is a flat JSON object whose values are byte strings
//! rendered in the envelope's configured [`Encoding`]:
//!
//! ```text
//! {"ciphertext":"…","nonce":"…","mac":"…","tag":"…","associatedData":"…"}
//! ```
//!
//! `tag` and `associatedData` are present only for AEAD algorithms.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

// ---------------------------------------------------------------------------
// Field encoding
// ---------------------------------------------------------------------------

/// How byte-string fields are rendered inside a [`Record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// One character per byte, U+0000 through U+00FF.
    #[default]
    #[serde(alias = "latin1")]
    Binary,
    /// Standard padded base64.
    Base64,
    /// Lowercase hexadecimal.
    Hex,
}

impl Encoding {
    /// Render `bytes` as a string in this encoding.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Binary => bytes.iter().copied().map(char::from).collect(),
            Encoding::Base64 => STANDARD.encode(bytes),
            Encoding::Hex => hex::encode(bytes),
        }
    }

    /// Parse a string produced by [`Encoding::encode`] back into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Parse`] if `text` is not valid in this encoding.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, EnvelopeError> {
        match self {
            Encoding::Binary => text
                .chars()
                .map(|c| {
                    u8::try_from(c).map_err(|_| {
                        EnvelopeError::Parse(format!("character {c:?} is outside the binary range"))
                    })
                })
                .collect(),
            Encoding::Base64 => STANDARD
                .decode(text)
                .map_err(|e| EnvelopeError::Parse(format!("invalid base64: {e}"))),
            Encoding::Hex => {
                hex::decode(text).map_err(|e| EnvelopeError::Parse(format!("invalid hex: {e}")))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope record
// ---------------------------------------------------------------------------

/// The serialized output of `seal` and the input of `open`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Encrypted payload.
    pub ciphertext: String,
    /// Per-seal random nonce (empty for nonce-less modes).
    pub nonce: String,
    /// Outer HMAC over the raw ciphertext bytes.
    pub mac: String,
    /// AEAD authentication tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// AEAD associated data bound into the tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_data: Option<String>,
}

impl Record {
    /// Serialize this record to its JSON text form.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Parse`] if serialization fails, which only
    /// happens for non-string map keys and is unreachable for this type.
    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::Parse(e.to_string()))
    }

    /// Parse a record from its JSON text form.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Parse`] if `text` is not a JSON object with the
    /// required string fields.
    pub fn from_json(text: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(text)
            .map_err(|e| EnvelopeError::Parse(format!("unable to parse record: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Error report
// ---------------------------------------------------------------------------

/// Machine-readable failure report emitted by front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Short machine-readable error code (e.g. `"tampered"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorReport {
    /// Construct an [`ErrorReport`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&EnvelopeError> for ErrorReport {
    fn from(e: &EnvelopeError) -> Self {
        Self::new(e.code(), e.to_string())
    }
}
