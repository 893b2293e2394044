//! Secret snapshot cipher.
//!
//! Encrypts environment-variable text blocks under the project key. The
//! human-copyable project-key token is hashed with SHA-256 to fit the exact
//! AES-256 key length; every encryption uses a fresh IV, so pushing the same
//! plaintext twice never produces the same ciphertext.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::core::aead;
use crate::core::constants::{CIPHER_KEY_LEN, IV_LEN, TAG_LEN};
use crate::core::custody::ProjectKey;
use crate::error::{Result, SnapshotError};

/// One encrypted secrets payload: the three fields a snapshot stores and a
/// decryptor needs, each hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretCiphertext {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
}

/// Fit the project-key token to the cipher's key length.
fn cipher_key(key: &ProjectKey) -> Zeroizing<[u8; CIPHER_KEY_LEN]> {
    let digest = Sha256::digest(key.expose().as_bytes());
    let mut out = Zeroizing::new([0u8; CIPHER_KEY_LEN]);
    out.copy_from_slice(&digest);
    out
}

/// Encrypt an environment text block under the project key.
pub fn encrypt(plaintext: &str, key: &ProjectKey) -> Result<SecretCiphertext> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let derived = cipher_key(key);
    let (ciphertext, auth_tag) = aead::seal(&derived, &iv, plaintext.as_bytes())
        .map_err(|e| SnapshotError::EncryptionFailed(e.to_string()))?;

    Ok(SecretCiphertext {
        ciphertext: hex::encode(ciphertext),
        iv: hex::encode(iv),
        auth_tag: hex::encode(auth_tag),
    })
}

/// Decrypt a snapshot payload.
///
/// Fails with [`SnapshotError::TamperedOrWrongKey`] when the tag does not
/// verify; no partially decrypted data is ever returned.
pub fn decrypt(sealed: &SecretCiphertext, key: &ProjectKey) -> Result<String> {
    let iv = decode_field(&sealed.iv, "iv", Some(IV_LEN))?;
    let auth_tag = decode_field(&sealed.auth_tag, "auth_tag", Some(TAG_LEN))?;
    let ciphertext = decode_field(&sealed.ciphertext, "ciphertext", None)?;

    let derived = cipher_key(key);
    let mut iv_arr = [0u8; IV_LEN];
    iv_arr.copy_from_slice(&iv);

    let plaintext = aead::open(&derived, &iv_arr, &ciphertext, &auth_tag)
        .map_err(|_| SnapshotError::TamperedOrWrongKey)?;

    String::from_utf8(plaintext).map_err(|_| SnapshotError::TamperedOrWrongKey.into())
}

fn decode_field(value: &str, field: &'static str, expected_len: Option<usize>) -> Result<Vec<u8>> {
    let bytes = hex::decode(value).map_err(|_| SnapshotError::MalformedField {
        field,
        reason: "not hex".to_string(),
    })?;
    if let Some(expected) = expected_len {
        if bytes.len() != expected {
            return Err(SnapshotError::MalformedField {
                field,
                reason: format!("length {}, expected {expected}", bytes.len()),
            }
            .into());
        }
    }
    Ok(bytes)
}
