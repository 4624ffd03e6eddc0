//! Bearer-token storage for the logged-in agent.
//!
//! One opaque token in a file under the user data directory. The token is
//! written at login, deleted at logout, and re-read before every upload; the
//! ledger and reconciliation code only ever read it. A missing token is a
//! recoverable condition, reported as an upload failure rather than an error
//! here.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// File name for the stored token
const TOKEN_FILE: &str = "token";

/// File-backed store for the agent's bearer token.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store rooted at the default user data directory.
    pub fn new() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("callkeep")
            .join(TOKEN_FILE);
        Self { path }
    }

    /// Store rooted at an explicit path (used by tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the stored token. None when no agent is logged in.
    pub fn token(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    /// Persist a token, replacing any existing one.
    pub fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        // Token is a credential: restrict to the owning user where supported
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Remove the stored token (logout). Removing an absent token is a no-op.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_read_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("token"));
        assert_eq!(store.token(), None);

        store.store("abc123").unwrap();
        assert_eq!(store.token(), Some("abc123".to_string()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("token"));
        store.store("abc123").unwrap();

        store.clear().unwrap();
        assert_eq!(store.token(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_token_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::at(dir.path().join("token"));
        store.store("  \n").unwrap();
        assert_eq!(store.token(), None);
    }
}
