//! The login session: a bearer token persisted between invocations of the CLI.
//!
//! A `Session` is handed to every authenticated backend call. Nothing reads the token from a
//! global; whoever holds the `Session` decides which account a request runs as.

use crate::error::{typed, ErrorType, IntoResult};
use crate::{utils, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the saved session, or `None` if nobody is logged in.
    pub async fn load(&self) -> Result<Option<Session>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let session = utils::deserialize(&self.path)
            .await
            .pub_result(ErrorType::Io)?;
        Ok(Some(session))
    }

    /// Returns the saved session or an authentication error telling the user to log in.
    pub async fn require(&self) -> Result<Session> {
        match self.load().await? {
            Some(session) if !session.token.is_empty() => Ok(session),
            _ => Err(typed(
                ErrorType::Auth,
                "Anda belum login. Jalankan 'cuan login' terlebih dahulu",
            )),
        }
    }

    /// Writes `session` with owner-only permissions.
    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            utils::make_dir(parent).await.pub_result(ErrorType::Io)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        utils::write_private(&self.path, json)
            .await
            .pub_result(ErrorType::Io)?;
        debug!("Saved session for {} to {}", session.email, self.path.display());
        Ok(())
    }

    /// Deletes the session file. Returns `false` if there was none.
    pub async fn clear(&self) -> Result<bool> {
        utils::remove(&self.path).await.pub_result(ErrorType::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type_of;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join(".secrets").join("session.json"));

        assert!(store.load().await.unwrap().is_none());
        let e = store.require().await.unwrap_err();
        assert_eq!(error_type_of(&e), Some(ErrorType::Auth));

        let session = Session::new("tok-123", "budi@example.com");
        store.save(&session).await.unwrap();
        let loaded = store.require().await.unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.token(), "tok-123");

        assert!(store.clear().await.unwrap());
        assert!(!store.clear().await.unwrap());
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let s = format!("{:?}", Session::new("very-secret", "a@b.co"));
        assert!(!s.contains("very-secret"));
        assert!(s.contains("a@b.co"));
    }
}
