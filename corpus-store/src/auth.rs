//! Identity provider seam and its local implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use corpus_core::AdminAccount;

use crate::error::StoreError;
use crate::persist::{read_json, remove_if_exists, write_json_atomic};

/// The signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuthProviderError {
    /// Unknown email or wrong password; the two are not told apart.
    #[error("invalid credential")]
    InvalidCredential,

    #[error("session storage failed: {0}")]
    Session(#[from] StoreError),
}

/// Email/password identity with an observable session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthProviderError>;

    /// Local state is cleared even when this returns an error.
    async fn sign_out(&self) -> Result<(), AuthProviderError>;

    fn current_user(&self) -> Option<User>;

    /// Session changes; the receiver starts at the current state.
    fn watch(&self) -> watch::Receiver<Option<User>>;
}

/// Checks credentials against the admin accounts from `config.yaml` and
/// optionally keeps the session in a file so it survives between runs.
#[derive(Debug)]
pub struct LocalAuth {
    admins: Vec<AdminAccount>,
    session_file: Option<PathBuf>,
    session: watch::Sender<Option<User>>,
}

impl LocalAuth {
    /// Memory-only session.
    pub fn new(admins: Vec<AdminAccount>) -> Self {
        let (session, _rx) = watch::channel(None);
        Self {
            admins,
            session_file: None,
            session,
        }
    }

    /// Session persisted at `path` (usually `~/.corpus/session.json`).
    ///
    /// An unreadable session, a cleared (`null`) one, or one for an email
    /// that is no longer an admin, starts signed out.
    pub fn with_session_file(admins: Vec<AdminAccount>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let restored = match read_json::<Option<User>>(&path) {
            Ok(user) => user.flatten(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable session");
                None
            }
        };
        let restored = restored.filter(|user| {
            admins
                .iter()
                .any(|admin| admin.email.trim().eq_ignore_ascii_case(user.email.trim()))
        });
        let (session, _rx) = watch::channel(restored);
        Self {
            admins,
            session_file: Some(path),
            session,
        }
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthProviderError> {
        let admin = self
            .admins
            .iter()
            .find(|admin| admin.verify(email, password))
            .ok_or(AuthProviderError::InvalidCredential)?;

        let user = User {
            email: admin.email.clone(),
            signed_in_at: Utc::now(),
        };
        if let Some(path) = &self.session_file {
            write_json_atomic(path, &user)?;
        }
        self.session.send_replace(Some(user.clone()));
        tracing::info!(email = %user.email, "admin signed in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        self.session.send_replace(None);
        if let Some(path) = &self.session_file {
            clear_session_file(path, remove_if_exists)?;
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.session.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<User>> {
        self.session.subscribe()
    }
}

/// Remove the session file, or overwrite it with `null` when it cannot be
/// removed. Either way the next process starts signed out.
fn clear_session_file(
    path: &Path,
    remove: impl FnOnce(&Path) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    let Err(err) = remove(path) else {
        return Ok(());
    };
    tracing::warn!(path = %path.display(), error = %err, "could not remove session; overwriting it");
    write_json_atomic(path, &None::<User>).map_err(|_| err)
}
