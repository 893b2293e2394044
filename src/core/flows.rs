//! Staged operation pipelines.
//!
//! Each flow is the crypto core of one user-facing operation: fetch context,
//! take the already-gathered parameters as plain data, perform the
//! operation, return plain data. Prompting, spinners, and file placement
//! belong to the excluded surfaces.
//!
//! Control flow is always vault unlock → project-key reveal → snapshot
//! encrypt/decrypt. Unlocked keys live for the duration of one call and are
//! never cached.

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::custody::{self, ProjectKey};
use crate::core::keypair::{KeyPair, PrivateIdentity, PublicIdentity};
use crate::core::remote::{
    CustodyService, DirectoryService, NewSnapshot, PullOutcome, SecretsService, SnapshotRecord,
};
use crate::core::session::{ProjectLink, Session};
use crate::core::snapshot;
use crate::core::vault::{self, VaultBundle};
use crate::error::{ApiError, CustodyError, Result};

/// What a pull produced.
#[derive(Debug)]
pub enum Pulled {
    /// Decrypted environment text plus the snapshot it came from.
    Secrets {
        plaintext: String,
        record: SnapshotRecord,
    },
    /// The environment has no snapshots yet; treat as empty, not as failure.
    Empty,
}

/// Result of a rollback: the newly created snapshot and the restored text.
#[derive(Debug)]
pub struct Rollback {
    pub record: SnapshotRecord,
    pub plaintext: String,
}

/// Outcome of the sharing step when every pending recipient succeeded.
#[derive(Debug, Default)]
pub struct ShareReport {
    /// Recipient user ids a grant was created for on this run. Empty when
    /// everyone already had access.
    pub granted: Vec<String>,
}

/// A freshly provisioned identity, ready to store in a [`Session`].
#[derive(Debug, Clone)]
pub struct ProvisionedIdentity {
    pub public_key: String,
    pub vault: VaultBundle,
}

fn unlock_identity(session: &Session, passphrase: &str) -> Result<PrivateIdentity> {
    let bundle = session.vault()?;
    let pem: Zeroizing<String> = vault::unlock(bundle, passphrase)?;
    PrivateIdentity::from_pem(&pem)
}

/// Unlock the vault and reveal the caller's project key.
///
/// The full custody lookup: every secret operation starts here.
pub fn obtain_project_key(
    session: &Session,
    passphrase: &str,
    custody_svc: &impl CustodyService,
    project_id: &str,
) -> Result<ProjectKey> {
    let private = unlock_identity(session, passphrase)?;
    let grant = custody_svc.my_grant(project_id)?;
    debug!(project_id, "revealing project key from own grant");
    custody::reveal(&grant.encrypted_key, &private)
}

/// Encrypt an environment text block and submit it as a new snapshot.
///
/// The server assigns the version; the returned record carries it.
pub fn push(
    session: &Session,
    passphrase: &str,
    custody_svc: &impl CustodyService,
    secrets_svc: &impl SecretsService,
    link: &ProjectLink,
    environment: &str,
    plaintext: &str,
) -> Result<SnapshotRecord> {
    let key = obtain_project_key(session, passphrase, custody_svc, &link.project_id)?;
    let sealed = snapshot::encrypt(plaintext, &key)?;

    let record = secrets_svc.create_snapshot(&NewSnapshot {
        project_id: link.project_id.clone(),
        environment: environment.to_string(),
        sealed,
    })?;

    debug!(environment, version = record.version, "snapshot pushed");
    Ok(record)
}

/// Fetch and decrypt the latest snapshot for an environment.
///
/// Returns [`Pulled::Empty`] when no snapshot exists yet. Callers must not
/// touch any local file until this has returned successfully.
pub fn pull(
    session: &Session,
    passphrase: &str,
    custody_svc: &impl CustodyService,
    secrets_svc: &impl SecretsService,
    link: &ProjectLink,
    environment: &str,
) -> Result<Pulled> {
    let key = obtain_project_key(session, passphrase, custody_svc, &link.project_id)?;

    match secrets_svc.latest_snapshot(&link.project_id, environment)? {
        PullOutcome::NotFound => {
            debug!(environment, "no snapshot yet, treating as empty environment");
            Ok(Pulled::Empty)
        }
        PullOutcome::Found(record) => {
            let plaintext = snapshot::decrypt(&record.sealed, &key)?;
            debug!(environment, version = record.version, "snapshot pulled");
            Ok(Pulled::Secrets { plaintext, record })
        }
    }
}

/// List an environment's snapshot history, newest first.
///
/// Metadata only; no vault unlock needed.
pub fn history(
    secrets_svc: &impl SecretsService,
    link: &ProjectLink,
    environment: &str,
) -> Result<Vec<SnapshotRecord>> {
    secrets_svc.history(&link.project_id, environment)
}

/// Restore an older snapshot's plaintext as a brand-new version.
///
/// Decrypts the target, then re-encrypts it with a fresh IV and pushes it;
/// history only ever grows, and earlier versions stay untouched.
pub fn rollback(
    session: &Session,
    passphrase: &str,
    custody_svc: &impl CustodyService,
    secrets_svc: &impl SecretsService,
    link: &ProjectLink,
    environment: &str,
    snapshot_id: &str,
) -> Result<Rollback> {
    let key = obtain_project_key(session, passphrase, custody_svc, &link.project_id)?;

    let target = secrets_svc.snapshot_by_id(snapshot_id)?;
    if target.project_id != link.project_id || target.environment != environment {
        return Err(ApiError::NotFound(format!(
            "snapshot {snapshot_id} does not belong to this project and environment"
        ))
        .into());
    }

    let plaintext = snapshot::decrypt(&target.sealed, &key)?;
    let sealed = snapshot::encrypt(&plaintext, &key)?;

    let record = secrets_svc.create_snapshot(&NewSnapshot {
        project_id: link.project_id.clone(),
        environment: environment.to_string(),
        sealed,
    })?;

    debug!(
        from_version = target.version,
        new_version = record.version,
        "rollback pushed as new snapshot"
    );

    Ok(Rollback { record, plaintext })
}

/// Create grants for every project member who lacks one.
///
/// Convergence step of the distribution protocol: at-least-once and
/// idempotent, since recipients who already hold a grant never appear in the
/// pending set. Fails closed — if the vault cannot be unlocked, no grant is
/// created for anyone. Per-recipient failures are collected and reported as
/// [`CustodyError::PartialShare`]; successes are never silently dropped.
pub fn share_pending(
    session: &Session,
    passphrase: &str,
    custody_svc: &impl CustodyService,
    link: &ProjectLink,
) -> Result<ShareReport> {
    let pending = custody_svc.pending_recipients(&link.project_id)?;
    if pending.is_empty() {
        debug!(project_id = %link.project_id, "no pending recipients");
        return Ok(ShareReport::default());
    }

    debug!(count = pending.len(), "sharing project key with pending recipients");

    // Unlock before touching any grant, so a bad passphrase creates none.
    let key = obtain_project_key(session, passphrase, custody_svc, &link.project_id)?;

    let mut granted = Vec::new();
    let mut failed = Vec::new();

    for recipient in &pending {
        let outcome = PublicIdentity::from_pem(&recipient.public_key)
            .and_then(|public| custody::grant_for(&key, &public))
            .and_then(|encrypted| {
                custody_svc.store_grant(&link.project_id, &recipient.user_id, &encrypted)
            });

        match outcome {
            Ok(()) => granted.push(recipient.user_id.clone()),
            Err(e) => {
                warn!(recipient = %recipient.user_id, error = %e, "grant creation failed");
                failed.push((recipient.user_id.clone(), e.to_string()));
            }
        }
    }

    if failed.is_empty() {
        Ok(ShareReport { granted })
    } else {
        Err(CustodyError::PartialShare { granted, failed }.into())
    }
}

/// Project-creation custody setup: generate the project key and grant it to
/// the creator. The plaintext key is dropped before returning.
pub fn create_project_custody(
    session: &Session,
    custody_svc: &impl CustodyService,
    project_id: &str,
) -> Result<()> {
    let public = PublicIdentity::from_pem(&session.public_key)?;
    let key = ProjectKey::generate();
    let encrypted = custody::grant_for(&key, &public)?;
    custody_svc.store_grant(project_id, &session.user_id, &encrypted)?;
    debug!(project_id, "project key generated and self-granted");
    Ok(())
}

/// Generate a key pair, lock it, and register the identity.
///
/// Used at signup and admin provisioning. Key generation is the slow step;
/// [`enroll_key_pair`] takes a pre-generated pair.
pub fn provision_account(
    user_id: &str,
    passphrase: &str,
    directory: &impl DirectoryService,
) -> Result<ProvisionedIdentity> {
    let pair = KeyPair::generate()?;
    enroll_key_pair(user_id, &pair, passphrase, directory)
}

/// Lock and register an already-generated key pair.
pub fn enroll_key_pair(
    user_id: &str,
    pair: &KeyPair,
    passphrase: &str,
    directory: &impl DirectoryService,
) -> Result<ProvisionedIdentity> {
    let public_key = pair.public_key_pem()?;
    let private_pem = pair.private_key_pem()?;
    let bundle = vault::lock(&private_pem, passphrase)?;

    directory.register_identity(user_id, &public_key, &bundle)?;
    debug!(user_id, "identity enrolled");

    Ok(ProvisionedIdentity {
        public_key,
        vault: bundle,
    })
}

/// Re-wrap the vault under a new passphrase and register the new bundle.
///
/// Returns the replacement bundle; the caller updates its stored session.
pub fn change_passphrase(
    session: &Session,
    old_passphrase: &str,
    new_passphrase: &str,
    directory: &impl DirectoryService,
) -> Result<VaultBundle> {
    let bundle = session.vault()?;
    let rewrapped = vault::relock(bundle, old_passphrase, new_passphrase)?;
    directory.register_identity(&session.user_id, &session.public_key, &rewrapped)?;
    Ok(rewrapped)
}
