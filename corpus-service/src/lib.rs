//! # corpus-service
//!
//! Back-office operations over the document store: ordered collections
//! (plans, team), live views, registration intake and the auth gate.
//!
//! Services hold an `Arc<dyn DocumentStore>` and no per-screen state, so
//! they are cheap to construct wherever they are needed.

mod codec;
pub mod auth;
pub mod error;
pub mod intake;
pub mod live;
pub mod ordered;

pub use auth::{Access, AuthGate, Route, SessionWatch};
pub use codec::record_query;
pub use error::ServiceError;
pub use intake::RegistrationIntake;
pub use live::{mount, LiveHandle, LiveState};
pub use ordered::{OrderedCollection, ReorderOutcome};
