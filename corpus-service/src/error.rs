//! Error types for corpus-service.

use thiserror::Error;

use corpus_core::{Collection, RecordId, ValidationError};
use corpus_store::StoreError;

/// All errors that can arise from back-office operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The store could not complete the request.
    #[error("persistence error: {0}")]
    Persistence(#[source] StoreError),

    #[error("no {collection} record with id '{id}'")]
    NotFound { collection: Collection, id: RecordId },

    /// Wrong email or password. The provider's reason is not exposed.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The identity provider failed for a reason other than bad credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Input rejected before reaching the store.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A stored document does not match its record shape.
    #[error("document '{id}' in {collection} is malformed: {source}")]
    Schema {
        collection: Collection,
        id: RecordId,
        #[source]
        source: serde_json::Error,
    },

    #[error("sign in required")]
    Unauthenticated,
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => ServiceError::NotFound { collection, id },
            other => ServiceError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err = ServiceError::from(StoreError::NotFound {
            collection: Collection::Plans,
            id: RecordId::from("p9"),
        });
        assert!(matches!(err, ServiceError::NotFound { .. }));
        assert_eq!(err.to_string(), "no plans record with id 'p9'");
    }

    #[test]
    fn other_store_errors_are_persistence() {
        let err = ServiceError::from(StoreError::Unavailable("offline".into()));
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(err.to_string().contains("offline"));
    }
}
