//! Project key custody.
//!
//! One symmetric project key per project, generated at project creation and
//! never rotated. The key travels only inside grants: per-recipient copies
//! encrypted under each authorized user's public key with RSA-OAEP-SHA256.
//! The server stores grants but can decrypt none of them.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::{PROJECT_KEY_ENTROPY, PROJECT_KEY_LEN};
use crate::core::keypair::{PrivateIdentity, PublicIdentity};
use crate::error::{CustodyError, Result};

/// A project's symmetric key, as a human-copyable hex token.
///
/// The token itself is the distributed artifact; the snapshot cipher hashes
/// it down to the exact AES key length. There is no revocation: a member
/// removed from a project keeps any key they already unwrapped, and the
/// design provides no rotation path.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ProjectKey {
    token: String,
}

impl ProjectKey {
    /// Generate a fresh random project key.
    pub fn generate() -> Self {
        let mut entropy = [0u8; PROJECT_KEY_ENTROPY];
        OsRng.fill_bytes(&mut entropy);
        let key = Self {
            token: hex::encode(entropy),
        };
        entropy.zeroize();
        key
    }

    /// Wrap an existing token, as recovered from a grant.
    pub fn from_token(token: String) -> Result<Self> {
        if token.is_empty() {
            return Err(CustodyError::MalformedGrant("empty project key".to_string()).into());
        }
        Ok(Self { token })
    }

    /// The raw token. Callers must not persist this.
    pub fn expose(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for ProjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectKey").finish_non_exhaustive()
    }
}

/// Encrypt the project key for one recipient.
///
/// The result is base64 and only the holder of the matching private key can
/// reverse it.
pub fn grant_for(key: &ProjectKey, recipient: &PublicIdentity) -> Result<String> {
    let mut rng = rand::thread_rng();
    let wrapped = recipient
        .raw()
        .encrypt(&mut rng, Oaep::new::<Sha256>(), key.expose().as_bytes())
        .map_err(|e| CustodyError::WrapFailed(e.to_string()))?;
    Ok(BASE64.encode(wrapped))
}

/// Decrypt a grant addressed to this private key.
///
/// Fails with [`CustodyError::UnwrapFailed`] when the grant was produced for
/// a different recipient or the blob is corrupt; OAEP padding makes a wrong
/// key indistinguishable from tampering, and no garbage plaintext escapes.
pub fn reveal(encrypted_key: &str, private: &PrivateIdentity) -> Result<ProjectKey> {
    let wrapped = BASE64
        .decode(encrypted_key.trim())
        .map_err(|_| CustodyError::MalformedGrant("grant is not base64".to_string()))?;

    let token_bytes = private
        .raw()
        .decrypt(Oaep::new::<Sha256>(), &wrapped)
        .map_err(|_| CustodyError::UnwrapFailed)?;

    let token = String::from_utf8(token_bytes).map_err(|_| CustodyError::UnwrapFailed)?;
    ProjectKey::from_token(token)
}
