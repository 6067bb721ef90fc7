//! Config error-message, atomic-write-safety and schema integration tests.

use assert_fs::prelude::*;
use corpus_core::{
    config::{self, AdminAccount, Config},
    ConfigError, Plan, Registration, TeamMember,
};
use predicates::prelude::predicate;
use std::fs;

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".corpus").create_dir_all().expect("mkdir");
    home.child(".corpus/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".corpus").create_dir_all().expect("mkdir");
    home.child(".corpus/config.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn load_rejects_booking_window_past_the_limit() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".corpus").create_dir_all().expect("mkdir");
    home.child(".corpus/config.yaml")
        .write_str("booking_window_days: 100000000\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::WindowOutOfRange { value: 100_000_000, max: 365, .. }),
        "got: {err}"
    );
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_rejects_negative_booking_window() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".corpus").create_dir_all().expect("mkdir");
    home.child(".corpus/config.yaml")
        .write_str("booking_window_days: -3\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::WindowOutOfRange { value: -3, .. }), "got: {err}");
}

#[test]
fn load_accepts_window_bounds() {
    for days in [0, config::MAX_BOOKING_WINDOW_DAYS] {
        let home = assert_fs::TempDir::new().expect("tempdir");
        home.child(".corpus").create_dir_all().expect("mkdir");
        home.child(".corpus/config.yaml")
            .write_str(&format!("booking_window_days: {days}\n"))
            .expect("write");
        let cfg = config::load_at(home.path()).expect("load");
        assert_eq!(cfg.booking_window_days, days);
    }
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_creates_config_and_cleans_up_tmp() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut cfg = Config::default();
    cfg.upsert_admin(AdminAccount::new("admin@corpusgym.com", "pw").expect("hash"));
    config::save_at(home.path(), &cfg).expect("save");

    home.child(".corpus/config.yaml")
        .assert(predicate::path::exists());
    home.child(".corpus/config.yaml.tmp")
        .assert(predicate::path::missing());
    home.child(".corpus/config.yaml")
        .assert(predicate::str::contains("admin@corpusgym.com"));
}

#[test]
fn crashed_write_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::save_at(home.path(), &Config::default()).expect("save");

    let path = config::config_path_at(home.path());
    let original = fs::read(&path).expect("read original");

    // A crash between write and rename leaves an orphan .tmp only.
    let tmp = path.with_file_name("config.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write tmp");

    assert_eq!(fs::read(&path).expect("read again"), original);
    assert_eq!(config::load_at(home.path()).expect("load"), Config::default());
}

// ---------------------------------------------------------------------------
// 3. Stored document shapes
// ---------------------------------------------------------------------------

#[test]
fn plan_document_from_store_decodes() {
    let plan: Plan = serde_json::from_str(
        r#"{"name":"Musculação | Anual","price":"R$ 109,00/mês",
            "features":["Acesso LIVRE à academia","Duração 12 meses"],
            "highlight":true,"special":true,"order":5}"#,
    )
    .expect("decode");
    assert_eq!(plan.order, 5);
    assert!(plan.highlight && plan.special);
}

#[test]
fn team_document_with_extra_field_is_rejected() {
    let err = serde_json::from_str::<TeamMember>(
        r#"{"name":"Ana","role":"Coach","image":"","order":0,"salary":1}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("salary"));
}

#[test]
fn registration_document_with_schedule_decodes() {
    let registration: Registration = serde_json::from_str(
        r#"{"name":"Bia","email":"bia@example.com","phone":"1199","plan":"Aula Experimental",
            "preferredDate":"2026-10-20","preferredTime":"07:00","registrationDate":1792300000000}"#,
    )
    .expect("decode");
    assert_eq!(
        registration.preferred_time.map(|t| t.to_string()).as_deref(),
        Some("07:00")
    );
}

#[test]
fn registration_with_malformed_time_is_rejected() {
    let result = serde_json::from_str::<Registration>(
        r#"{"name":"Bia","email":"bia@example.com","phone":"1199","plan":"Aula Experimental",
            "preferredTime":"7h","registrationDate":0}"#,
    );
    assert!(result.is_err());
}
