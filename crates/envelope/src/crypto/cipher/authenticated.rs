//! AEAD modes with detached tags: GCM, CCM, OCB3, GCM-SIV.

use aead::consts::{U12, U16};
use aead::generic_array::typenum::Unsigned;
use aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::AesGcm;
use aes_gcm_siv::AesGcmSiv;
use ccm::Ccm;
use ocb3::Ocb3;
use zeroize::Zeroize;

use super::{with_aes, CipherError};
use crate::crypto::matrix::{AeadKind, KeyBits};

/// Encrypt `plaintext` and return `(ciphertext, tag)`.
pub(super) fn seal(
    kind: AeadKind,
    bits: KeyBits,
    tag_len: usize,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CipherError> {
    with_aes!(bits, A => match (kind, tag_len) {
        (AeadKind::Gcm, 16) => seal_with::<AesGcm<A, U12, U16>>(key, nonce, plaintext, aad),
        (AeadKind::Gcm, 12) => seal_with::<AesGcm<A, U12, U12>>(key, nonce, plaintext, aad),
        (AeadKind::Ccm, 16) => seal_with::<Ccm<A, U16, U12>>(key, nonce, plaintext, aad),
        (AeadKind::Ccm, 12) => seal_with::<Ccm<A, U12, U12>>(key, nonce, plaintext, aad),
        (AeadKind::Ocb, 16) => seal_with::<Ocb3<A, U12, U16>>(key, nonce, plaintext, aad),
        (AeadKind::GcmSiv, 16) => seal_with::<AesGcmSiv<A>>(key, nonce, plaintext, aad),
        (_, other) => Err(CipherError::InvalidTagLength(other)),
    })
}

/// Verify `tag` over `ciphertext` and `aad`, then return the plaintext.
#[allow(clippy::too_many_arguments)]
pub(super) fn open(
    kind: AeadKind,
    bits: KeyBits,
    tag_len: usize,
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CipherError> {
    with_aes!(bits, A => match (kind, tag_len) {
        (AeadKind::Gcm, 16) => open_with::<AesGcm<A, U12, U16>>(key, nonce, ciphertext, tag, aad),
        (AeadKind::Gcm, 12) => open_with::<AesGcm<A, U12, U12>>(key, nonce, ciphertext, tag, aad),
        (AeadKind::Ccm, 16) => open_with::<Ccm<A, U16, U12>>(key, nonce, ciphertext, tag, aad),
        (AeadKind::Ccm, 12) => open_with::<Ccm<A, U12, U12>>(key, nonce, ciphertext, tag, aad),
        (AeadKind::Ocb, 16) => open_with::<Ocb3<A, U12, U16>>(key, nonce, ciphertext, tag, aad),
        (AeadKind::GcmSiv, 16) => open_with::<AesGcmSiv<A>>(key, nonce, ciphertext, tag, aad),
        (_, other) => Err(CipherError::InvalidTagLength(other)),
    })
}

fn seal_with<C>(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CipherError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    let nonce = nonce_for::<C>(nonce)?;

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(nonce, aad, &mut buffer) {
        Ok(tag) => tag,
        Err(_) => {
            buffer.zeroize();
            return Err(CipherError::EncryptFailure);
        }
    };
    Ok((buffer, tag.to_vec()))
}

fn open_with<C>(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CipherError>
where
    C: AeadInPlace + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    let nonce = nonce_for::<C>(nonce)?;
    // A tag of the wrong length cannot authenticate anything.
    if tag.len() != C::TagSize::USIZE {
        return Err(CipherError::AeadFailure);
    }
    let tag = Tag::<C>::from_slice(tag);

    let mut buffer = ciphertext.to_vec();
    if cipher
        .decrypt_in_place_detached(nonce, aad, &mut buffer, tag)
        .is_err()
    {
        buffer.zeroize();
        return Err(CipherError::AeadFailure);
    }
    Ok(buffer)
}

fn nonce_for<C: AeadInPlace>(nonce: &[u8]) -> Result<&Nonce<C>, CipherError> {
    let expected = C::NonceSize::USIZE;
    if nonce.len() != expected {
        return Err(CipherError::InvalidNonceLength {
            expected,
            actual: nonce.len(),
        });
    }
    Ok(Nonce::<C>::from_slice(nonce))
}
