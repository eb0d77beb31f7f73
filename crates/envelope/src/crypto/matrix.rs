//! Closed table of supported algorithm identifiers and their size defaults.
//!
//! Identifiers follow the familiar `aes-<bits>-<mode>` naming. Anything not
//! listed in [`ALGORITHMS`] is rejected at configuration time rather than
//! silently treated as a default.

use std::fmt;
use std::str::FromStr;

use common::EnvelopeError;

/// AES key strength named by the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBits {
    Aes128,
    Aes192,
    Aes256,
}

impl KeyBits {
    /// Length in bytes of a single AES key of this strength.
    pub const fn key_len(self) -> usize {
        match self {
            KeyBits::Aes128 => 16,
            KeyBits::Aes192 => 24,
            KeyBits::Aes256 => 32,
        }
    }
}

/// Authenticated modes. These produce a detached tag and bind associated data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadKind {
    /// Galois/Counter Mode.
    Gcm,
    /// Counter with CBC-MAC.
    Ccm,
    /// Offset codebook, version 3.
    Ocb,
    /// Nonce-misuse-resistant GCM (RFC 8452).
    GcmSiv,
}

/// Unauthenticated modes. Integrity comes solely from the outer MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMode {
    Cbc,
    Ctr,
    Cfb,
    Ofb,
    /// Electronic codebook. No nonce; leaks plaintext block equality.
    Ecb,
    /// XEX tweaked codebook with ciphertext stealing; the nonce is the tweak.
    Xts,
}

/// Which branch of the cipher engine an algorithm takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Aead(AeadKind),
    Plain(BlockMode),
}

/// A fully resolved algorithm: key strength plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Algorithm {
    pub key_bits: KeyBits,
    pub mode: CipherMode,
}

/// Default sizes for an algorithm, before explicit overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    /// Authentication tag length in bits. Only meaningful for AEAD modes.
    pub tag_bits: u32,
    /// Nonce length in bytes.
    pub nonce_len: usize,
    /// Key length in bytes.
    pub key_len: usize,
}

impl Sizes {
    /// Tag length in bytes.
    pub const fn tag_len(&self) -> usize {
        (self.tag_bits / 8) as usize
    }
}

/// Every identifier the envelope accepts.
pub const ALGORITHMS: &[(&str, Algorithm)] = &[
    ("aes-128-cbc", Algorithm::plain(KeyBits::Aes128, BlockMode::Cbc)),
    ("aes-192-cbc", Algorithm::plain(KeyBits::Aes192, BlockMode::Cbc)),
    ("aes-256-cbc", Algorithm::plain(KeyBits::Aes256, BlockMode::Cbc)),
    ("aes-128-ctr", Algorithm::plain(KeyBits::Aes128, BlockMode::Ctr)),
    ("aes-192-ctr", Algorithm::plain(KeyBits::Aes192, BlockMode::Ctr)),
    ("aes-256-ctr", Algorithm::plain(KeyBits::Aes256, BlockMode::Ctr)),
    ("aes-128-cfb", Algorithm::plain(KeyBits::Aes128, BlockMode::Cfb)),
    ("aes-192-cfb", Algorithm::plain(KeyBits::Aes192, BlockMode::Cfb)),
    ("aes-256-cfb", Algorithm::plain(KeyBits::Aes256, BlockMode::Cfb)),
    ("aes-128-ofb", Algorithm::plain(KeyBits::Aes128, BlockMode::Ofb)),
    ("aes-192-ofb", Algorithm::plain(KeyBits::Aes192, BlockMode::Ofb)),
    ("aes-256-ofb", Algorithm::plain(KeyBits::Aes256, BlockMode::Ofb)),
    ("aes-128-ecb", Algorithm::plain(KeyBits::Aes128, BlockMode::Ecb)),
    ("aes-192-ecb", Algorithm::plain(KeyBits::Aes192, BlockMode::Ecb)),
    ("aes-256-ecb", Algorithm::plain(KeyBits::Aes256, BlockMode::Ecb)),
    ("aes-128-xts", Algorithm::plain(KeyBits::Aes128, BlockMode::Xts)),
    ("aes-256-xts", Algorithm::plain(KeyBits::Aes256, BlockMode::Xts)),
    ("aes-128-gcm", Algorithm::aead(KeyBits::Aes128, AeadKind::Gcm)),
    ("aes-192-gcm", Algorithm::aead(KeyBits::Aes192, AeadKind::Gcm)),
    ("aes-256-gcm", Algorithm::aead(KeyBits::Aes256, AeadKind::Gcm)),
    ("aes-128-ccm", Algorithm::aead(KeyBits::Aes128, AeadKind::Ccm)),
    ("aes-192-ccm", Algorithm::aead(KeyBits::Aes192, AeadKind::Ccm)),
    ("aes-256-ccm", Algorithm::aead(KeyBits::Aes256, AeadKind::Ccm)),
    ("aes-128-ocb", Algorithm::aead(KeyBits::Aes128, AeadKind::Ocb)),
    ("aes-192-ocb", Algorithm::aead(KeyBits::Aes192, AeadKind::Ocb)),
    ("aes-256-ocb", Algorithm::aead(KeyBits::Aes256, AeadKind::Ocb)),
    ("aes-128-gcm-siv", Algorithm::aead(KeyBits::Aes128, AeadKind::GcmSiv)),
    ("aes-256-gcm-siv", Algorithm::aead(KeyBits::Aes256, AeadKind::GcmSiv)),
];

/// Identifier used when none is configured.
pub const DEFAULT_ALGORITHM: &str = "aes-256-gcm";

impl Algorithm {
    const fn plain(key_bits: KeyBits, mode: BlockMode) -> Self {
        Self {
            key_bits,
            mode: CipherMode::Plain(mode),
        }
    }

    const fn aead(key_bits: KeyBits, kind: AeadKind) -> Self {
        Self {
            key_bits,
            mode: CipherMode::Aead(kind),
        }
    }

    /// Canonical identifier for this algorithm.
    pub fn name(&self) -> &'static str {
        ALGORITHMS
            .iter()
            .find(|(_, alg)| alg == self)
            .map_or("unlisted", |(name, _)| *name)
    }

    pub const fn is_aead(&self) -> bool {
        matches!(self.mode, CipherMode::Aead(_))
    }

    /// ECB is the only mode considered unsafe for general payloads.
    pub const fn is_insecure(&self) -> bool {
        matches!(self.mode, CipherMode::Plain(BlockMode::Ecb))
    }

    /// Size defaults, applied rule by rule with later rules overriding earlier ones.
    pub fn defaults(&self) -> Sizes {
        let mut sizes = Sizes {
            tag_bits: 128,
            nonce_len: 16,
            key_len: 32,
        };

        if self.is_aead() {
            sizes.nonce_len = 12;
        }
        match self.key_bits {
            KeyBits::Aes192 => sizes.key_len = 24,
            KeyBits::Aes128 => sizes.key_len = 16,
            KeyBits::Aes256 => {}
        }
        if self.mode == CipherMode::Plain(BlockMode::Ecb) {
            sizes.nonce_len = 0;
        }
        if self.mode == CipherMode::Plain(BlockMode::Xts) {
            sizes.key_len = 32;
            if self.key_bits == KeyBits::Aes256 {
                sizes.key_len = 64;
            }
        }
        sizes
    }

    /// Key length the cipher primitive accepts. XTS takes two AES keys.
    pub const fn required_key_len(&self) -> usize {
        match self.mode {
            CipherMode::Plain(BlockMode::Xts) => 2 * self.key_bits.key_len(),
            _ => self.key_bits.key_len(),
        }
    }

    /// Nonce length the cipher primitive accepts.
    pub const fn required_nonce_len(&self) -> usize {
        match self.mode {
            CipherMode::Aead(_) => 12,
            CipherMode::Plain(BlockMode::Ecb) => 0,
            CipherMode::Plain(_) => 16,
        }
    }

    /// Whether the cipher primitive can produce a tag of `tag_bits` bits.
    pub const fn supports_tag_bits(&self, tag_bits: u32) -> bool {
        match self.mode {
            CipherMode::Aead(AeadKind::Gcm | AeadKind::Ccm) => matches!(tag_bits, 96 | 128),
            CipherMode::Aead(AeadKind::Ocb | AeadKind::GcmSiv) => tag_bits == 128,
            CipherMode::Plain(_) => true,
        }
    }

    /// Resolve the final sizes: explicit overrides win, but must be sizes the
    /// cipher accepts.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Configuration`] for an override the cipher
    /// cannot use.
    pub fn resolve_sizes(
        &self,
        tag_bits: Option<u32>,
        nonce_len: Option<usize>,
        key_len: Option<usize>,
    ) -> Result<Sizes, EnvelopeError> {
        let defaults = self.defaults();
        let sizes = Sizes {
            tag_bits: tag_bits.unwrap_or(defaults.tag_bits),
            nonce_len: nonce_len.unwrap_or(defaults.nonce_len),
            key_len: key_len.unwrap_or(defaults.key_len),
        };

        if sizes.key_len != self.required_key_len() {
            return Err(EnvelopeError::Configuration(format!(
                "invalid key size {} for {}: expected {} bytes",
                sizes.key_len,
                self.name(),
                self.required_key_len()
            )));
        }
        if sizes.nonce_len != self.required_nonce_len() {
            return Err(EnvelopeError::Configuration(format!(
                "invalid nonce size {} for {}: expected {} bytes",
                sizes.nonce_len,
                self.name(),
                self.required_nonce_len()
            )));
        }
        if self.is_aead() && !self.supports_tag_bits(sizes.tag_bits) {
            return Err(EnvelopeError::Configuration(format!(
                "unsupported tag size {} bits for {}",
                sizes.tag_bits,
                self.name()
            )));
        }
        Ok(sizes)
    }
}

impl FromStr for Algorithm {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALGORITHMS
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, alg)| *alg)
            .ok_or_else(|| EnvelopeError::Configuration(format!("unsupported algorithm {s:?}")))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alg(name: &str) -> Algorithm {
        name.parse().unwrap()
    }

    #[test]
    fn key_sizes_follow_key_bits() {
        assert_eq!(alg("aes-128-cbc").defaults().key_len, 16);
        assert_eq!(alg("aes-192-cbc").defaults().key_len, 24);
        assert_eq!(alg("aes-256-cbc").defaults().key_len, 32);
    }

    #[test]
    fn aead_modes_use_twelve_byte_nonces() {
        for name in ["aes-256-gcm", "aes-128-ccm", "aes-192-ocb", "aes-256-gcm-siv"] {
            assert_eq!(alg(name).defaults().nonce_len, 12, "{name}");
        }
        assert_eq!(alg("aes-256-ctr").defaults().nonce_len, 16);
    }

    #[test]
    fn ecb_has_no_nonce() {
        assert_eq!(alg("aes-256-ecb").defaults().nonce_len, 0);
        assert!(alg("aes-128-ecb").is_insecure());
    }

    #[test]
    fn xts_doubles_key() {
        assert_eq!(alg("aes-128-xts").defaults().key_len, 32);
        assert_eq!(alg("aes-256-xts").defaults().key_len, 64);
    }

    #[test]
    fn defaults_agree_with_primitive_requirements() {
        for (name, algorithm) in ALGORITHMS {
            let d = algorithm.defaults();
            assert_eq!(d.key_len, algorithm.required_key_len(), "{name}");
            assert_eq!(d.nonce_len, algorithm.required_nonce_len(), "{name}");
            assert_eq!(d.tag_bits, 128, "{name}");
            assert!(algorithm.resolve_sizes(None, None, None).is_ok(), "{name}");
        }
    }

    #[test]
    fn names_round_trip() {
        for (name, algorithm) in ALGORITHMS {
            assert_eq!(algorithm.name(), *name);
            assert_eq!(alg(name), *algorithm);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(alg("AES-256-GCM"), alg("aes-256-gcm"));
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        for name in ["aes-512-gcm", "des-ede3-cbc", "", "aes-192-xts"] {
            assert!(
                matches!(name.parse::<Algorithm>(), Err(EnvelopeError::Configuration(_))),
                "{name:?}"
            );
        }
    }

    #[test]
    fn overrides_must_fit_the_cipher() {
        let gcm = alg("aes-256-gcm");
        assert_eq!(gcm.resolve_sizes(Some(96), None, None).unwrap().tag_len(), 12);
        assert!(gcm.resolve_sizes(Some(100), None, None).is_err());
        assert!(gcm.resolve_sizes(None, Some(16), None).is_err());
        assert!(gcm.resolve_sizes(None, None, Some(99999)).is_err());
        assert!(alg("aes-256-ocb").resolve_sizes(Some(96), None, None).is_err());
    }

    #[test]
    fn plain_modes_ignore_tag_override() {
        assert!(alg("aes-256-cbc").resolve_sizes(Some(64), None, None).is_ok());
    }
}
