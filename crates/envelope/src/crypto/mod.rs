//! Cryptographic building blocks for the envelope.
//!
//! Nothing in here knows about records or text encodings; it works on bytes.

pub mod mac;

pub mod backend;
pub mod cipher;
pub mod kdf;
pub mod matrix;
pub mod nonce;

pub use backend::{CryptoBackend, RustCrypto};
pub use kdf::KeyStretch;
pub use mac::HashAlgorithm;
pub use matrix::{Algorithm, Sizes};
