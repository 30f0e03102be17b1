//! Persisted bearer-token session
//!
//! The session survives restarts as a small JSON file. Any 401 from the
//! server resets it to [`Session::Anonymous`], so every surface of the
//! client observes the logout at once.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ClientResult;
use shared::models::User;

/// Authentication state carried across requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Session {
    Anonymous,
    Authenticated { token: String, user: User },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated { user, .. } => Some(user),
            Session::Anonymous => None,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::Anonymous
    }
}

/// File-backed storage for [`Session`]
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the persisted session. A missing or unreadable file is an
    /// anonymous session, not an error: stale state must never lock the
    /// user out of logging in again.
    pub fn load(&self) -> Session {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                Session::Anonymous
            }),
            Err(_) => Session::Anonymous,
        }
    }

    /// Persist the session, creating parent directories as needed
    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| crate::error::ClientError::Decode(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Drop the persisted state back to anonymous
    pub fn reset(&self) -> ClientResult<()> {
        self.save(&Session::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::UserRole;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "director@example.com".to_string(),
            name: "Director".to_string(),
            role: UserRole::Commercial,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn session_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        let session = Session::Authenticated {
            token: "token-123".to_string(),
            user: user(),
        };
        store.save(&session).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.token(), Some("token-123"));
        assert_eq!(loaded.user().map(|u| u.email.as_str()), Some("director@example.com"));
    }

    #[test]
    fn missing_file_loads_as_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nope.json"));
        assert!(!store.load().is_authenticated());
    }

    #[test]
    fn corrupt_file_loads_as_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(!store.load().is_authenticated());
    }

    #[test]
    fn reset_clears_a_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));

        store
            .save(&Session::Authenticated {
                token: "t".to_string(),
                user: user(),
            })
            .unwrap();
        store.reset().unwrap();

        assert!(!store.load().is_authenticated());
        assert_eq!(store.load().token(), None);
    }
}
