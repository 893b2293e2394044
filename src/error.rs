//! Error taxonomy for envault.
//!
//! Cryptographic failures are terminal for the current operation and are
//! never retried automatically. Authenticated-decryption failures carry a
//! single signal each: the variants deliberately do not distinguish "wrong
//! passphrase" from "corrupt data", or "wrong key" from "tampered
//! ciphertext".

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Keypair(#[from] KeypairError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Custody(#[from] CustodyError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identity key-pair failures (generation and PEM encoding).
#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("key pair generation failed: {0}")]
    Generation(String),

    #[error("key encoding failed: {0}")]
    Encoding(String),

    #[error("key decoding failed: {0}")]
    Decoding(String),
}

/// Identity-vault failures.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Authenticated decryption of the vault failed. One signal for both
    /// causes; callers must not be able to tell them apart.
    #[error("invalid passphrase or corrupt vault")]
    InvalidPassphraseOrCorrupt,

    #[error("malformed vault bundle: {0}")]
    MalformedBundle(String),

    #[error("unsupported vault algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("vault encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Project-key custody failures.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// The grant was not produced for this private key, or is corrupt.
    #[error("could not unwrap project key: wrong recipient or corrupt grant")]
    UnwrapFailed,

    #[error("could not wrap project key: {0}")]
    WrapFailed(String),

    #[error("malformed grant: {0}")]
    MalformedGrant(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Some grants were persisted and some were not. Reports both sets so
    /// the caller can re-run the sharing step for the failed recipients.
    #[error("shared with {} recipient(s), failed for {}", granted.len(), failed.len())]
    PartialShare {
        /// Recipient user ids a grant was stored for.
        granted: Vec<String>,
        /// (recipient user id, reason) pairs that failed.
        failed: Vec<(String, String)>,
    },
}

/// Secret-snapshot cipher failures.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Authentication tag did not verify: the ciphertext was tampered with
    /// or the project key is wrong. Never yields partial plaintext.
    #[error("snapshot decryption failed: tampered data or wrong project key")]
    TamperedOrWrongKey,

    #[error("malformed snapshot field {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    #[error("snapshot encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Local session-state problems (missing vault, unlinked directory).
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("local vault is missing: login again to restore it")]
    MissingVault,

    #[error("no linked project: link a project first")]
    NotLinked,
}

/// Failures surfaced by the external persistence services.
///
/// The variants map to different recovery flows in the caller: re-login,
/// re-link, or retry later. "No snapshot yet" is not an error and is
/// reported as [`crate::core::remote::PullOutcome::NotFound`] instead.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unauthorized: login again")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
