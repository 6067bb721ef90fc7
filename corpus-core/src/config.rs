//! Back-office configuration file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.corpus/
//!   config.yaml      (mode 0600: admins, booking policy, store dir)
//!   session.json     (signed-in admin, written by the auth provider)
//!   store/
//!     plans.json
//!     team.json
//!     registrations.json
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, ConfigError};

/// Plan label that turns a registration into a trial-class booking.
pub const TRIAL_PLAN_LABEL: &str = "Aula Experimental";

/// How many days ahead a trial class may be booked.
pub const BOOKING_WINDOW_DAYS: i64 = 30;

/// Upper bound accepted for `booking_window_days`.
pub const MAX_BOOKING_WINDOW_DAYS: i64 = 365;

pub const CONFIG_FILE: &str = "config.yaml";
pub const SESSION_FILE: &str = "session.json";

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// An admin allowed through the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    /// Salted Argon2id PHC string (`$argon2id$...`).
    ///
    /// Files written before salting hold a bare hex SHA-256 digest under
    /// `password_sha256`; those still verify until `corpus init` rewrites
    /// the account.
    #[serde(alias = "password_sha256")]
    pub password_hash: String,
}

impl AdminAccount {
    pub fn new(email: impl Into<String>, password: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            email: email.into(),
            password_hash: hash_password(password)?,
        })
    }

    /// Email compares case-insensitively.
    pub fn verify(&self, email: &str, password: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
            && verify_password(&self.password_hash, password)
    }
}

/// Root of `config.yaml`. Every field has a default so a partial file loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where collection files live; `~/.corpus/store` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    pub trial_plan_label: String,
    pub booking_window_days: i64,
    pub admins: Vec<AdminAccount>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            trial_plan_label: TRIAL_PLAN_LABEL.to_string(),
            booking_window_days: BOOKING_WINDOW_DAYS,
            admins: Vec::new(),
        }
    }
}

impl Config {
    /// Resolved store directory for this home.
    pub fn store_dir_at(&self, home: &Path) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| default_store_dir(home))
    }

    /// Add an admin, replacing any account with the same email.
    pub fn upsert_admin(&mut self, account: AdminAccount) {
        self.admins
            .retain(|existing| !existing.email.eq_ignore_ascii_case(&account.email));
        self.admins.push(account);
    }
}

/// Argon2id with a fresh random salt, as a PHC string.
pub fn hash_password(password: &str) -> Result<String, ConfigError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConfigError::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string or a legacy hex digest.
/// An unparseable PHC string never verifies.
pub fn verify_password(stored: &str, password: &str) -> bool {
    if !stored.starts_with('$') {
        return stored.eq_ignore_ascii_case(&legacy_digest(password));
    }
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Unsalted hex SHA-256, the format of accounts saved before Argon2.
fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.corpus/`
pub fn corpus_root(home: &Path) -> PathBuf {
    home.join(".corpus")
}

/// `<home>/.corpus/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    corpus_root(home).join(CONFIG_FILE)
}

/// `<home>/.corpus/session.json`. Pure, no I/O.
pub fn session_path_at(home: &Path) -> PathBuf {
    corpus_root(home).join(SESSION_FILE)
}

/// `<home>/.corpus/store/`
pub fn default_store_dir(home: &Path) -> PathBuf {
    corpus_root(home).join("store")
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// Load `<home>/.corpus/config.yaml`.
///
/// A missing file yields [`Config::default`] (no admins); a malformed one
/// returns `ConfigError::Parse` with the path, and a booking window outside
/// `0..=MAX_BOOKING_WINDOW_DAYS` returns `ConfigError::WindowOutOfRange`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        source: e,
    })?;
    if !(0..=MAX_BOOKING_WINDOW_DAYS).contains(&config.booking_window_days) {
        return Err(ConfigError::WindowOutOfRange {
            path,
            value: config.booking_window_days,
            max: MAX_BOOKING_WINDOW_DAYS,
        });
    }
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the config.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let root = corpus_root(home);
    if !root.exists() {
        std::fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
        set_dir_permissions(&root)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name(format!("{CONFIG_FILE}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_loads_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = load_at(home.path()).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.trial_plan_label, "Aula Experimental");
        assert_eq!(config.booking_window_days, 30);
    }

    #[test]
    fn store_dir_defaults_under_corpus_root() {
        let home = TempDir::new().expect("tempdir");
        let config = Config::default();
        assert!(config
            .store_dir_at(home.path())
            .ends_with(".corpus/store"));
    }

    #[test]
    fn password_hash_is_salted_argon2id() {
        let first = hash_password("s3nha").unwrap();
        let second = hash_password("s3nha").unwrap();
        assert!(first.starts_with("$argon2id$"), "got: {first}");
        assert_ne!(first, second);
        assert!(verify_password(&first, "s3nha"));
        assert!(verify_password(&second, "s3nha"));
        assert!(!verify_password(&first, "S3nha"));
    }

    #[test]
    fn legacy_sha256_digest_still_verifies() {
        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert!(verify_password(digest, "abc"));
        assert!(!verify_password(digest, "abd"));
    }

    #[test]
    fn garbled_phc_string_never_verifies() {
        assert!(!verify_password("$argon2id$not-a-hash", "anything"));
    }

    #[test]
    fn legacy_field_name_loads() {
        let home = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(corpus_root(home.path())).unwrap();
        std::fs::write(
            config_path_at(home.path()),
            "admins:\n  - email: admin@corpusgym.com\n    password_sha256: \
             ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\n",
        )
        .unwrap();
        let config = load_at(home.path()).expect("load");
        assert!(config.admins[0].verify("admin@corpusgym.com", "abc"));
    }

    #[test]
    fn admin_verify_ignores_email_case() {
        let admin = AdminAccount::new("Admin@CorpusGym.com", "s3nha").unwrap();
        assert!(admin.verify("admin@corpusgym.com", "s3nha"));
        assert!(!admin.verify("admin@corpusgym.com", "wrong"));
        assert!(!admin.verify("other@corpusgym.com", "s3nha"));
    }

    #[test]
    fn upsert_admin_replaces_same_email() {
        let mut config = Config::default();
        config.upsert_admin(AdminAccount::new("a@x.com", "one").unwrap());
        config.upsert_admin(AdminAccount::new("A@X.com", "two").unwrap());
        assert_eq!(config.admins.len(), 1);
        assert!(config.admins[0].verify("a@x.com", "two"));
    }

    #[test]
    fn save_and_load_roundtrip_with_perms() {
        let home = TempDir::new().expect("tempdir");
        let mut config = Config::default();
        config.upsert_admin(AdminAccount::new("admin@corpusgym.com", "pw").unwrap());
        save_at(home.path(), &config).expect("save");

        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, config);

        let tmp = config_path_at(home.path()).with_file_name("config.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(config_path_at(home.path()))
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn partial_file_fills_defaults() {
        let home = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(corpus_root(home.path())).unwrap();
        std::fs::write(config_path_at(home.path()), "booking_window_days: 14\n").unwrap();
        let config = load_at(home.path()).expect("load");
        assert_eq!(config.booking_window_days, 14);
        assert_eq!(config.trial_plan_label, TRIAL_PLAN_LABEL);
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
    }
}
