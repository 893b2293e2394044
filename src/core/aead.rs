//! AES-256-GCM primitives shared by the vault and snapshot ciphers.
//!
//! The wire format keeps ciphertext and authentication tag as separate
//! fields, so these helpers split the tag off the AEAD output on seal and
//! stitch it back on open.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::core::constants::{CIPHER_KEY_LEN, IV_LEN, TAG_LEN};

/// Encrypt `plaintext`, returning `(ciphertext, auth_tag)`.
pub(crate) fn seal(
    key: &[u8; CIPHER_KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), aes_gcm::Error> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut combined = cipher.encrypt(Nonce::from_slice(iv), plaintext)?;
    let tag = combined.split_off(combined.len() - TAG_LEN);
    Ok((combined, tag))
}

/// Authenticated decryption. Fails if the tag does not verify.
pub(crate) fn open(
    key: &[u8; CIPHER_KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    auth_tag: &[u8],
) -> Result<Vec<u8>, aes_gcm::Error> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let mut combined = Vec::with_capacity(ciphertext.len() + auth_tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(auth_tag);
    cipher.decrypt(Nonce::from_slice(iv), combined.as_slice())
}
