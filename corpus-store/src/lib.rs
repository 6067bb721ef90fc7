//! Document store and identity provider for the gym back office.
//!
//! [`DocumentStore`] and [`AuthProvider`] are the seams the service layer
//! talks to. [`LocalStore`] and [`LocalAuth`] implement them over JSON files
//! under `~/.corpus/`.

pub mod auth;
pub mod document;
pub mod error;
pub mod local;
mod persist;
pub mod store;
pub mod watcher;

pub use auth::{AuthProvider, AuthProviderError, LocalAuth, User};
pub use document::{Document, Fields, Query};
pub use error::StoreError;
pub use local::LocalStore;
pub use store::{CollectionFeed, DocumentStore, Subscription};
pub use watcher::{watch_store_dir, StoreWatcher};
