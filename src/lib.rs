//! Envault - end-to-end encrypted environment secrets for development teams.
//!
//! The server stores only ciphertext: wrapped private keys, per-recipient
//! wrapped project keys, and versioned secret snapshots. Plaintext keys and
//! secrets exist only inside the client process for the duration of a single
//! operation.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error          # Error taxonomy (thiserror)
//! └── core/          # Core library components
//!     ├── keypair    # Identity key pairs (RSA-OAEP)
//!     ├── vault      # Passphrase-wrapped private keys (PBKDF2 + AES-256-GCM)
//!     ├── custody    # Project keys and per-recipient grants
//!     ├── snapshot   # Versioned secret-snapshot cipher
//!     ├── session    # Explicit session / project-link records
//!     ├── remote     # Service traits and typed wire records
//!     ├── flows      # push / pull / history / rollback / share pipelines
//!     └── envfile    # Deferred local .env writing
//! ```
//!
//! # Trust model
//!
//! - A user's private key never leaves an identity vault except in memory.
//! - A project key is readable only by users holding a grant addressed to
//!   their public key, and only after unlocking their own vault.
//! - Snapshots are immutable; edits and rollbacks always append a new
//!   version, assigned by the server.

pub mod core;
pub mod error;

pub use crate::core::custody::ProjectKey;
pub use crate::core::flows::{self, Pulled, Rollback, ShareReport};
pub use crate::core::keypair::{KeyPair, PrivateIdentity, PublicIdentity};
pub use crate::core::remote::{
    CustodyService, DirectoryService, GrantRecord, NewSnapshot, PendingRecipient, PullOutcome,
    SecretsService, SnapshotRecord,
};
pub use crate::core::session::{ProjectLink, Session};
pub use crate::core::snapshot::SecretCiphertext;
pub use crate::core::vault::VaultBundle;
pub use crate::error::{Error, Result};
