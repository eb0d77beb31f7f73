//! Per-seal nonce generation.

use super::backend::CryptoBackend;
use super::cipher::CipherError;

/// Return `size` fresh random bytes from the backend's CSPRNG.
///
/// A zero `size` returns an empty vector without touching the RNG, which is
/// what nonce-less modes (ECB) expect.
///
/// # Errors
///
/// Returns [`CipherError::Rng`] if the CSPRNG cannot produce bytes.
pub fn generate(backend: &dyn CryptoBackend, size: usize) -> Result<Vec<u8>, CipherError> {
    let mut nonce = vec![0u8; size];
    if size > 0 {
        backend.fill_random(&mut nonce)?;
    }
    Ok(nonce)
}
