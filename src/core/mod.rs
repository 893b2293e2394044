//! Core library components.
//!
//! The envelope key-management and secret-encryption primitives, plus the
//! staged flows that compose them against the external services.

pub(crate) mod aead;
pub mod constants;
pub mod custody;
pub mod envfile;
pub mod flows;
pub mod keypair;
pub mod remote;
pub mod session;
pub mod snapshot;
pub mod vault;
