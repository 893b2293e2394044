//! Local session and project-link records.
//!
//! The stored login state and the per-directory project link are modeled as
//! explicit records passed into each flow, not ambient globals. How they are
//! persisted (global config file, `.envault` link file) belongs to the
//! excluded surfaces; the core only reads them.

use serde::{Deserialize, Serialize};

use crate::core::vault::VaultBundle;
use crate::error::{Result, SessionError};

/// The logged-in user's state as restored at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    /// The user's public key, SPKI PEM.
    pub public_key: String,
    /// Wrapped private key; absent until the account is provisioned or after
    /// a fresh install, in which case every key operation fails early.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultBundle>,
}

impl Session {
    /// The vault bundle, or the "login again" error when it is missing.
    pub fn vault(&self) -> Result<&VaultBundle> {
        self.vault.as_ref().ok_or_else(|| SessionError::MissingVault.into())
    }
}

/// The project a working directory is linked to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLink {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

impl ProjectLink {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: None,
            server_url: None,
        }
    }
}

/// A possibly-unlinked directory, as loaded by the excluded config layer.
///
/// Flows take a [`ProjectLink`]; this helper turns "no link file" into the
/// uniform [`SessionError::NotLinked`].
pub fn require_link(link: Option<&ProjectLink>) -> Result<&ProjectLink> {
    link.ok_or_else(|| SessionError::NotLinked.into())
}
