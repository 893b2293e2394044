//! Shared test harness: an in-memory stand-in for the custody, secrets, and
//! identity services, plus user fixtures.
//!
//! The fake mirrors the server-side contracts the core relies on: version
//! assignment is serialized per (project, environment), and grant storage is
//! an idempotent upsert keyed by (project, recipient).

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use envault::core::flows;
use envault::error::{ApiError, Result};
use envault::{
    CustodyService, DirectoryService, GrantRecord, KeyPair, NewSnapshot, PendingRecipient,
    PullOutcome, SecretsService, Session, SnapshotRecord, VaultBundle,
};

/// Small RSA modulus so key generation stays fast in tests.
pub const TEST_RSA_BITS: usize = 2048;

#[derive(Clone)]
struct Member {
    user_id: String,
    full_name: String,
    email: String,
    public_key: String,
}

#[derive(Default)]
struct State {
    /// (project_id, recipient_user_id) -> encrypted key.
    grants: BTreeMap<(String, String), String>,
    /// project_id -> authorized members.
    members: BTreeMap<String, Vec<Member>>,
    snapshots: Vec<SnapshotRecord>,
    /// user_id -> (public key, vault bundle).
    identities: BTreeMap<String, (String, VaultBundle)>,
    next_snapshot_id: u64,
}

/// In-memory persistence shared by all clients in a test.
#[derive(Default)]
pub struct InMemoryServer {
    state: Mutex<State>,
}

impl InMemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service handle authenticated as `user_id`.
    pub fn client(&self, user_id: &str) -> Client<'_> {
        Client {
            server: self,
            user_id: user_id.to_string(),
        }
    }

    /// Add a user to a project's team (authorization only; no grant).
    pub fn add_member(&self, project_id: &str, session: &Session) {
        let mut state = self.state.lock().unwrap();
        state
            .members
            .entry(project_id.to_string())
            .or_default()
            .push(Member {
                user_id: session.user_id.clone(),
                full_name: session.user_id.clone(),
                email: session.email.clone(),
                public_key: session.public_key.clone(),
            });
    }

    pub fn grant_count(&self, project_id: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .grants
            .keys()
            .filter(|(p, _)| p == project_id)
            .count()
    }

    pub fn stored_vault(&self, user_id: &str) -> Option<VaultBundle> {
        let state = self.state.lock().unwrap();
        state.identities.get(user_id).map(|(_, v)| v.clone())
    }
}

/// A per-user view of the server, like an authenticated API client.
pub struct Client<'a> {
    server: &'a InMemoryServer,
    user_id: String,
}

impl CustodyService for Client<'_> {
    fn my_grant(&self, project_id: &str) -> Result<GrantRecord> {
        let state = self.server.state.lock().unwrap();
        let key = (project_id.to_string(), self.user_id.clone());
        match state.grants.get(&key) {
            Some(encrypted_key) => Ok(GrantRecord {
                project_id: project_id.to_string(),
                recipient_user_id: self.user_id.clone(),
                encrypted_key: encrypted_key.clone(),
            }),
            None => Err(ApiError::NotFound(format!(
                "no grant for user {} in project {project_id}",
                self.user_id
            ))
            .into()),
        }
    }

    fn pending_recipients(&self, project_id: &str) -> Result<Vec<PendingRecipient>> {
        let state = self.server.state.lock().unwrap();
        let members = state.members.get(project_id).cloned().unwrap_or_default();
        Ok(members
            .into_iter()
            .filter(|m| {
                !state
                    .grants
                    .contains_key(&(project_id.to_string(), m.user_id.clone()))
            })
            .map(|m| PendingRecipient {
                user_id: m.user_id,
                full_name: m.full_name,
                email: m.email,
                public_key: m.public_key,
            })
            .collect())
    }

    fn store_grant(
        &self,
        project_id: &str,
        recipient_user_id: &str,
        encrypted_key: &str,
    ) -> Result<()> {
        let mut state = self.server.state.lock().unwrap();
        state.grants.insert(
            (project_id.to_string(), recipient_user_id.to_string()),
            encrypted_key.to_string(),
        );
        Ok(())
    }
}

impl SecretsService for Client<'_> {
    fn create_snapshot(&self, snapshot: &NewSnapshot) -> Result<SnapshotRecord> {
        let mut state = self.server.state.lock().unwrap();

        let version = state
            .snapshots
            .iter()
            .filter(|s| {
                s.project_id == snapshot.project_id && s.environment == snapshot.environment
            })
            .map(|s| s.version)
            .max()
            .unwrap_or(0)
            + 1;

        state.next_snapshot_id += 1;
        let record = SnapshotRecord {
            id: format!("snap-{}", state.next_snapshot_id),
            project_id: snapshot.project_id.clone(),
            environment: snapshot.environment.clone(),
            version,
            sealed: snapshot.sealed.clone(),
            created_at: Utc::now(),
            created_by: self.user_id.clone(),
        };
        state.snapshots.push(record.clone());
        Ok(record)
    }

    fn latest_snapshot(&self, project_id: &str, environment: &str) -> Result<PullOutcome> {
        let state = self.server.state.lock().unwrap();
        let latest = state
            .snapshots
            .iter()
            .filter(|s| s.project_id == project_id && s.environment == environment)
            .max_by_key(|s| s.version)
            .cloned();
        Ok(match latest {
            Some(record) => PullOutcome::Found(record),
            None => PullOutcome::NotFound,
        })
    }

    fn history(&self, project_id: &str, environment: &str) -> Result<Vec<SnapshotRecord>> {
        let state = self.server.state.lock().unwrap();
        let mut records: Vec<_> = state
            .snapshots
            .iter()
            .filter(|s| s.project_id == project_id && s.environment == environment)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(records)
    }

    fn snapshot_by_id(&self, snapshot_id: &str) -> Result<SnapshotRecord> {
        let state = self.server.state.lock().unwrap();
        state
            .snapshots
            .iter()
            .find(|s| s.id == snapshot_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("snapshot {snapshot_id}")).into())
    }
}

impl DirectoryService for Client<'_> {
    fn register_identity(
        &self,
        user_id: &str,
        public_key: &str,
        vault: &VaultBundle,
    ) -> Result<()> {
        let mut state = self.server.state.lock().unwrap();
        state.identities.insert(
            user_id.to_string(),
            (public_key.to_string(), vault.clone()),
        );
        Ok(())
    }
}

/// Wraps a custody service and fails `store_grant` for one recipient, for
/// partial-failure tests.
pub struct FlakyCustody<'a> {
    pub inner: Client<'a>,
    pub fail_for: String,
}

impl CustodyService for FlakyCustody<'_> {
    fn my_grant(&self, project_id: &str) -> Result<GrantRecord> {
        self.inner.my_grant(project_id)
    }

    fn pending_recipients(&self, project_id: &str) -> Result<Vec<PendingRecipient>> {
        self.inner.pending_recipients(project_id)
    }

    fn store_grant(
        &self,
        project_id: &str,
        recipient_user_id: &str,
        encrypted_key: &str,
    ) -> Result<()> {
        if recipient_user_id == self.fail_for {
            return Err(ApiError::Transport("connection reset".to_string()).into());
        }
        self.inner.store_grant(project_id, recipient_user_id, encrypted_key)
    }
}

/// A provisioned user: registered identity plus local session state.
pub struct TestUser {
    pub session: Session,
    pub passphrase: String,
}

/// Generate a key pair, enroll it with the directory, and build the session
/// a logged-in client would hold.
pub fn create_user(
    server: &InMemoryServer,
    user_id: &str,
    email: &str,
    passphrase: &str,
) -> TestUser {
    let pair = KeyPair::generate_with_bits(TEST_RSA_BITS).unwrap();
    let identity =
        flows::enroll_key_pair(user_id, &pair, passphrase, &server.client(user_id)).unwrap();

    TestUser {
        session: Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            public_key: identity.public_key,
            vault: Some(identity.vault),
        },
        passphrase: passphrase.to_string(),
    }
}
