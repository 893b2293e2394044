//! Boundary to the external persistence services.
//!
//! The HTTP transport, auth tokens, and the server itself are excluded
//! collaborators; the core sees them only through these traits and typed
//! records. Server responses decode into explicit structs so a shape
//! mismatch fails here, not deep inside a crypto routine.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::snapshot::SecretCiphertext;
use crate::core::vault::VaultBundle;
use crate::error::{ApiError, Result};

/// One (project, user) grant as the custody service stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRecord {
    pub project_id: String,
    pub recipient_user_id: String,
    /// The project key wrapped for this recipient, base64.
    pub encrypted_key: String,
}

/// A project member who is authorized but holds no grant yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRecipient {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    /// SPKI PEM.
    pub public_key: String,
}

/// One immutable versioned snapshot as the secrets service stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub project_id: String,
    pub environment: String,
    /// Assigned by the server; monotonically increasing per
    /// (project, environment).
    pub version: u64,
    #[serde(flatten)]
    pub sealed: SecretCiphertext,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// A snapshot submission. Carries no version: the server assigns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSnapshot {
    pub project_id: String,
    pub environment: String,
    #[serde(flatten)]
    pub sealed: SecretCiphertext,
}

/// Result of asking for the latest snapshot of an environment.
///
/// An environment with no snapshots yet is a normal state, not an error;
/// transport and authorization failures travel on the `Err` channel as
/// [`ApiError`].
#[derive(Debug, Clone)]
pub enum PullOutcome {
    Found(SnapshotRecord),
    NotFound,
}

/// Key-custody persistence: grants and the pending-recipients query.
pub trait CustodyService {
    /// The caller's own grant for this project.
    fn my_grant(&self, project_id: &str) -> Result<GrantRecord>;

    /// Authorized members of the project who have no grant yet.
    ///
    /// A recipient who already holds a grant never appears here, which is
    /// what makes the sharing step idempotent.
    fn pending_recipients(&self, project_id: &str) -> Result<Vec<PendingRecipient>>;

    /// Persist a grant. Idempotent upsert keyed by (project, recipient).
    fn store_grant(&self, project_id: &str, recipient_user_id: &str, encrypted_key: &str)
        -> Result<()>;
}

/// Secret-snapshot persistence.
pub trait SecretsService {
    /// Store a new snapshot; the server serializes version assignment per
    /// (project, environment) and returns the full record.
    fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord>;

    /// The highest-version snapshot for an environment, if any.
    fn latest_snapshot(&self, project_id: &str, environment: &str) -> Result<PullOutcome>;

    /// All snapshots for an environment, version descending.
    fn history(&self, project_id: &str, environment: &str) -> Result<Vec<SnapshotRecord>>;

    /// Fetch one snapshot by id (rollback source lookup).
    fn snapshot_by_id(&self, snapshot_id: &str) -> Result<SnapshotRecord>;
}

/// Identity/account persistence: where vault bundles and public keys live.
pub trait DirectoryService {
    /// Store or replace a user's public key and wrapped private key.
    fn register_identity(&self, user_id: &str, public_key: &str, vault: &VaultBundle)
        -> Result<()>;
}

/// Decode a raw JSON response into a typed record.
///
/// Transport adapters use this so missing or misshapen fields surface as
/// [`ApiError::BadResponse`] before any crypto runs.
pub fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::BadResponse(e.to_string()).into())
}
