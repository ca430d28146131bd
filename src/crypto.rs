//! # Crypto Helper
//!
//! Symmetric encryption of serialized payloads exchanged over a share channel.
//! Payloads are encrypted with AES-256 in CBC mode (PKCS#7 padding) under a
//! fresh random IV and encoded as `hex(iv):hex(ciphertext)`.
//!
//! There is no authentication tag: a tampered ciphertext that still unpads
//! correctly decrypts to garbage rather than failing. Callers needing integrity
//! must add it at a higher layer.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the initialization vector in bytes.
pub const IV_LENGTH: usize = 16;

/// Length of the key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Encrypt `payload` with `key` (raw bytes, must be 32 bytes long).
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if the key is not 32 bytes.
pub fn encrypt(key: &str, payload: &str) -> Result<String, CryptoError> {
    let key = key_bytes(key)?;
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(payload.as_bytes());

    Ok(format!("{}:{}", bytes_to_hex(&iv), bytes_to_hex(&ciphertext)))
}

/// Decrypt a payload produced by [`encrypt`].
///
/// # Errors
///
/// Returns an error if the payload is malformed, the key has the wrong length,
/// or decryption fails (typically a wrong key).
pub fn decrypt(key: &str, payload: &str) -> Result<String, CryptoError> {
    let key = key_bytes(key)?;
    let Some((iv_hex, ciphertext_hex)) = payload.split_once(':') else {
        return Err(CryptoError::MalformedPayload("missing ':' separator".into()));
    };
    let iv = hex_to_bytes(iv_hex)?;
    if iv.len() != IV_LENGTH {
        return Err(CryptoError::MalformedPayload(format!(
            "expected {IV_LENGTH} byte iv, got {}",
            iv.len()
        )));
    }
    let ciphertext = hex_to_bytes(ciphertext_hex)?;

    let cipher = Aes256CbcDec::new_from_slices(key, &iv)
        .map_err(|_| CryptoError::InvalidKeyLength(key.len()))?;
    let plaintext =
        cipher.decrypt_padded_vec_mut::<Pkcs7>(&ciphertext).map_err(|_| CryptoError::Decrypt)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

/// Lower-case hex encoding of `bytes`.
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string.
///
/// # Errors
///
/// Returns an error if the string is not valid hex.
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(hex::decode(hex_str)?)
}

fn key_bytes(key: &str) -> Result<&[u8], CryptoError> {
    let bytes = key.as_bytes();
    if bytes.len() != KEY_LENGTH {
        return Err(CryptoError::InvalidKeyLength(bytes.len()));
    }
    Ok(bytes)
}
