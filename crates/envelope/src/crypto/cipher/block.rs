//! Unauthenticated block modes. Integrity comes from the outer MAC only.
//!
//! CBC, ECB and XTS pad with PKCS#7; CTR, CFB and OFB are length-preserving.
//! XTS takes the nonce as its 16-byte tweak and a double-length key.

use cipher::block_padding::{Pkcs7, RawPadding};
use cipher::{
    AsyncStreamCipher, BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyInit, KeyIvInit,
    StreamCipher,
};
use xts_mode::Xts128;

use super::{with_aes, CipherError};
use crate::crypto::matrix::{BlockMode, KeyBits};

const BLOCK: usize = 16;

pub(super) fn encrypt(
    mode: BlockMode,
    bits: KeyBits,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let bad_key = |_: InvalidLength| CipherError::InvalidKeyLength(key.len());
    with_aes!(bits, A => match mode {
        BlockMode::Cbc => Ok(cbc::Encryptor::<A>::new_from_slices(key, nonce)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        BlockMode::Ecb => Ok(ecb::Encryptor::<A>::new_from_slice(key)
            .map_err(bad_key)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        BlockMode::Ctr => {
            let mut buf = plaintext.to_vec();
            ctr::Ctr128BE::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
        BlockMode::Cfb => {
            let mut buf = plaintext.to_vec();
            cfb_mode::Encryptor::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .encrypt(&mut buf);
            Ok(buf)
        }
        BlockMode::Ofb => {
            let mut buf = plaintext.to_vec();
            ofb::Ofb::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
        BlockMode::Xts => {
            let (data_key, tweak_key) = split_xts_key(key)?;
            let xts = Xts128::<A>::new(
                A::new_from_slice(data_key).map_err(bad_key)?,
                A::new_from_slice(tweak_key).map_err(bad_key)?,
            );
            let mut buf = pad(plaintext);
            xts.encrypt_sector(&mut buf, tweak(nonce)?);
            Ok(buf)
        }
    })
}

pub(super) fn decrypt(
    mode: BlockMode,
    bits: KeyBits,
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let bad_key = |_: InvalidLength| CipherError::InvalidKeyLength(key.len());
    with_aes!(bits, A => match mode {
        BlockMode::Cbc => cbc::Decryptor::<A>::new_from_slices(key, nonce)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::Padding),
        BlockMode::Ecb => ecb::Decryptor::<A>::new_from_slice(key)
            .map_err(bad_key)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CipherError::Padding),
        BlockMode::Ctr => {
            let mut buf = ciphertext.to_vec();
            ctr::Ctr128BE::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
        BlockMode::Cfb => {
            let mut buf = ciphertext.to_vec();
            cfb_mode::Decryptor::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .decrypt(&mut buf);
            Ok(buf)
        }
        BlockMode::Ofb => {
            let mut buf = ciphertext.to_vec();
            ofb::Ofb::<A>::new_from_slices(key, nonce)
                .map_err(bad_key)?
                .apply_keystream(&mut buf);
            Ok(buf)
        }
        BlockMode::Xts => {
            if ciphertext.is_empty() || ciphertext.len() % BLOCK != 0 {
                return Err(CipherError::Padding);
            }
            let (data_key, tweak_key) = split_xts_key(key)?;
            let xts = Xts128::<A>::new(
                A::new_from_slice(data_key).map_err(bad_key)?,
                A::new_from_slice(tweak_key).map_err(bad_key)?,
            );
            let mut buf = ciphertext.to_vec();
            xts.decrypt_sector(&mut buf, tweak(nonce)?);
            unpad(buf)
        }
    })
}

fn split_xts_key(key: &[u8]) -> Result<(&[u8], &[u8]), CipherError> {
    if key.is_empty() || key.len() % 2 != 0 {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Ok(key.split_at(key.len() / 2))
}

fn tweak(nonce: &[u8]) -> Result<[u8; BLOCK], CipherError> {
    <[u8; BLOCK]>::try_from(nonce).map_err(|_| CipherError::InvalidNonceLength {
        expected: BLOCK,
        actual: nonce.len(),
    })
}

/// PKCS#7 to a whole number of blocks; always adds at least one byte.
fn pad(plaintext: &[u8]) -> Vec<u8> {
    let full = plaintext.len() - plaintext.len() % BLOCK;
    let mut buf = plaintext.to_vec();
    buf.resize(full + BLOCK, 0);
    Pkcs7::raw_pad(&mut buf[full..], plaintext.len() - full);
    buf
}

fn unpad(mut buf: Vec<u8>) -> Result<Vec<u8>, CipherError> {
    let last = buf.len() - BLOCK;
    let kept = Pkcs7::raw_unpad(&buf[last..])
        .map_err(|_| CipherError::Padding)?
        .len();
    buf.truncate(last + kept);
    Ok(buf)
}
