//! Untyped documents and ordered queries over them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use corpus_core::{Collection, RecordId, SortDirection};

/// A flat field map, as the store keeps it.
pub type Fields = serde_json::Map<String, Value>;

/// One stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub fields: Fields,
}

/// "All documents of a collection, ordered by one field".
///
/// Documents lacking the sort field are left out of the result. Ties keep
/// the store's insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: Collection,
    pub order_by: String,
    pub direction: SortDirection,
}

impl Query {
    pub fn new(collection: Collection, order_by: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            collection,
            order_by: order_by.into(),
            direction,
        }
    }

    pub fn ascending(collection: Collection, order_by: impl Into<String>) -> Self {
        Self::new(collection, order_by, SortDirection::Ascending)
    }

    pub fn descending(collection: Collection, order_by: impl Into<String>) -> Self {
        Self::new(collection, order_by, SortDirection::Descending)
    }

    /// Apply the ordering to documents given in insertion sequence.
    pub fn apply(&self, documents: &[Document]) -> Vec<Document> {
        let mut selected: Vec<Document> = documents
            .iter()
            .filter(|doc| doc.fields.contains_key(&self.order_by))
            .cloned()
            .collect();
        // sort_by is stable, so equal keys stay in insertion sequence.
        selected.sort_by(|a, b| {
            let ordering = compare_values(
                a.fields.get(&self.order_by),
                b.fields.get(&self.order_by),
            );
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        selected
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_u64(), y.as_u64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (a, b) => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}
