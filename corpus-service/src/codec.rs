//! Typed records to and from flat store documents.

use serde::Serialize;
use serde_json::Value;

use corpus_core::{Identified, Record};
use corpus_store::{Document, Fields, Query, StoreError};

use crate::error::ServiceError;

/// The display query of a record type.
pub fn record_query<R: Record>() -> Query {
    Query::new(R::COLLECTION, R::SORT_FIELD, R::SORT)
}

/// Serialize a record or patch into a field map.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Fields, ServiceError> {
    match serde_json::to_value(value).map_err(StoreError::from)? {
        Value::Object(fields) => Ok(fields),
        other => Err(ServiceError::Persistence(StoreError::Json(
            <serde_json::Error as serde::ser::Error>::custom(format!(
                "expected a field map, got {other}"
            )),
        ))),
    }
}

pub(crate) fn decode<R: Record>(document: Document) -> Result<Identified<R>, ServiceError> {
    let Document { id, fields } = document;
    match serde_json::from_value::<R>(Value::Object(fields)) {
        Ok(record) => Ok(Identified { id, record }),
        Err(source) => Err(ServiceError::Schema {
            collection: R::COLLECTION,
            id,
            source,
        }),
    }
}

/// Decode a snapshot, logging and skipping documents of the wrong shape.
pub(crate) fn decode_lenient<R: Record>(documents: Vec<Document>) -> Vec<Identified<R>> {
    documents
        .into_iter()
        .filter_map(|document| match decode::<R>(document) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed document");
                None
            }
        })
        .collect()
}
