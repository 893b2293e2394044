//! Local secrets-file writing.
//!
//! Callers decrypt first, write second: these helpers are only reached with
//! fully decrypted text in hand, and the write itself goes through a
//! temporary sibling file plus rename so an interrupted write never leaves a
//! truncated `.env` behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

use crate::error::Result;

/// Write decrypted environment text to `path`, replacing any existing file.
pub fn write_env(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(".env");
    let tmp_name = format!(".{file_name}.tmp");
    let tmp_path = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.join(&tmp_name),
        None => PathBuf::from(&tmp_name),
    };

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    debug!(path = %path.display(), bytes = contents.len(), "secrets file written");
    Ok(())
}

/// Header content for an environment that has no snapshots yet.
pub fn placeholder(environment: &str) -> String {
    format!(
        "# Envault environment: {environment}\n# Created {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}
