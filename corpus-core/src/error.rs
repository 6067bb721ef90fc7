//! Error types for corpus-core.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::booking::TimeSlot;

/// Caller-side validation failures. These never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty or whitespace-only.
    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("'{value}' is not a valid email address")]
    InvalidEmail { value: String },

    /// Team member pictures must be absolute http(s) URLs.
    #[error("'{value}' is not an absolute http(s) URL")]
    InvalidUrl { value: String },

    #[error("'{value}' is not a valid HH:MM time")]
    InvalidTime { value: String },

    #[error("trial class bookings need a preferred date and time")]
    MissingTrialSchedule,

    #[error("{date} is in the past; the earliest bookable day is {earliest}")]
    DateInPast { date: NaiveDate, earliest: NaiveDate },

    #[error("{date} is more than {window_days} days ahead; the latest bookable day is {latest}")]
    DateTooFar {
        date: NaiveDate,
        latest: NaiveDate,
        window_days: i64,
    },

    #[error("a booking window of {window_days} days is not usable")]
    InvalidWindow { window_days: i64 },

    #[error("the gym is closed on Sundays ({date})")]
    ClosedOnSunday { date: NaiveDate },

    #[error("{time} is not an available slot on {date}")]
    UnavailableSlot { date: NaiveDate, time: TimeSlot },
}

/// All errors that can arise from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `booking_window_days` outside `0..=MAX_BOOKING_WINDOW_DAYS`.
    #[error("booking_window_days in {path} must be between 0 and {max}, got {value}")]
    WindowOutOfRange { path: PathBuf, value: i64, max: i64 },

    #[error("could not hash the admin password: {0}")]
    PasswordHash(String),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
