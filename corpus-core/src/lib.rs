//! Corpus core library: record schemas, booking rules, configuration and errors.
//!
//! - [`types`]: newtypes, collections and the `Plan` / `TeamMember` /
//!   `Registration` schemas
//! - [`booking`]: trial-class slots and registration validation
//! - [`config`]: `~/.corpus/config.yaml` load / save
//! - [`error`]: [`ValidationError`], [`ConfigError`]

pub mod booking;
pub mod config;
pub mod error;
pub mod types;
pub mod validate;

pub use booking::{available_slots, BookingPolicy, TimeSlot};
pub use config::{AdminAccount, Config};
pub use error::{ConfigError, ValidationError};
pub use types::{
    Collection, Direction, Identified, OrderedRecord, Plan, PlanPatch, Record, RecordId,
    Registration, RegistrationForm, SortDirection, TeamMember, TeamMemberPatch, ORDER_FIELD,
};
