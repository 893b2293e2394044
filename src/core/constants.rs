//! Constants used throughout envault.
//!
//! Centralizes cipher parameters and algorithm identifiers.

/// Algorithm identifier stored in every vault bundle.
///
/// Unlock refuses bundles carrying any other identifier, so the format can
/// evolve without silently misinterpreting old records.
pub const VAULT_ALGORITHM: &str = "aes-256-gcm";

/// PBKDF2-HMAC-SHA256 iteration count for vault key derivation.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derived-key length in bytes (AES-256).
pub const CIPHER_KEY_LEN: usize = 32;

/// Per-vault random salt length in bytes.
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length in bytes.
pub const IV_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// RSA modulus size for identity key pairs.
pub const RSA_KEY_BITS: usize = 4096;

/// Project-key token length in characters (hex of [`PROJECT_KEY_ENTROPY`] bytes).
pub const PROJECT_KEY_LEN: usize = 32;

/// Random bytes behind one project-key token.
pub const PROJECT_KEY_ENTROPY: usize = 16;
