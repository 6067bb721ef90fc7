//! Wiring shared by every command: config, store, session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use corpus_core::{config, BookingPolicy, Config, OrderedRecord};
use corpus_service::{AuthGate, OrderedCollection, RegistrationIntake};
use corpus_store::{AuthProvider, DocumentStore, LocalAuth, LocalStore, User};

pub struct Backoffice {
    pub config: Config,
    pub store: Arc<LocalStore>,
    pub gate: AuthGate,
    session_path: PathBuf,
}

impl Backoffice {
    pub fn open() -> Result<Self> {
        let home: PathBuf = config::home().context("could not determine home directory")?;
        Self::open_at(&home)
    }

    pub fn open_at(home: &Path) -> Result<Self> {
        let config = config::load_at(home).context("failed to load ~/.corpus/config.yaml")?;
        let store_dir = config.store_dir_at(home);
        tracing::debug!(store = %store_dir.display(), admins = config.admins.len(), "opening back office");
        let store = LocalStore::open(&store_dir)
            .with_context(|| format!("failed to open store at {}", store_dir.display()))?;
        let session_path = config::session_path_at(home);
        let auth = LocalAuth::with_session_file(config.admins.clone(), &session_path);
        Ok(Self {
            config,
            store: Arc::new(store),
            gate: AuthGate::new(Arc::new(auth)),
            session_path,
        })
    }

    pub fn documents(&self) -> Arc<dyn DocumentStore> {
        self.store.clone()
    }

    pub fn collection<R: OrderedRecord>(&self) -> OrderedCollection<R> {
        OrderedCollection::new(self.documents())
    }

    pub fn intake(&self) -> RegistrationIntake {
        RegistrationIntake::new(self.documents(), BookingPolicy::from(&self.config))
    }

    /// The session the next `corpus` run would restore from disk.
    pub fn persisted_session(&self) -> Option<User> {
        LocalAuth::with_session_file(self.config.admins.clone(), &self.session_path).current_user()
    }

    /// The signed-in admin, or an error telling the operator how to sign in.
    pub fn require_admin(&self) -> Result<User> {
        self.gate
            .require_user()
            .context("admin session required; run `corpus login <email>` first")
    }
}
