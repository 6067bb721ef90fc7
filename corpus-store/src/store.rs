//! The document store seam.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use corpus_core::{Collection, RecordId};

use crate::document::{Document, Fields, Query};
use crate::error::StoreError;

/// Raw feed of one collection: every document in insertion sequence.
pub type CollectionFeed = watch::Receiver<Arc<Vec<Document>>>;

/// CRUD plus live queries over named collections of flat documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document; the store assigns and returns its id.
    async fn add(&self, collection: Collection, fields: Fields) -> Result<RecordId, StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Returns `StoreError::NotFound` if `id` does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Remove a document permanently.
    ///
    /// Returns `StoreError::NotFound` if `id` does not exist.
    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &RecordId)
        -> Result<Option<Document>, StoreError>;

    /// One-shot ordered read.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Live ordered read; see [`Subscription`].
    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;
}

/// A live query. Each [`next_snapshot`](Subscription::next_snapshot) yields
/// the complete ordered result, never a diff.
///
/// Changes arriving faster than the consumer reads are coalesced; the
/// snapshot handed out is always the latest one. Dropping the subscription
/// detaches it from the store.
#[derive(Debug)]
pub struct Subscription {
    query: Query,
    feed: CollectionFeed,
    primed: bool,
}

impl Subscription {
    pub fn new(query: Query, feed: CollectionFeed) -> Self {
        Self {
            query,
            feed,
            primed: false,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The first call returns the current state at once; later calls wait
    /// for the next change. `None` once the store has gone away.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Document>> {
        if self.primed {
            self.feed.changed().await.ok()?;
        } else {
            self.primed = true;
        }
        let documents = Arc::clone(&self.feed.borrow_and_update());
        Some(self.query.apply(&documents))
    }
}
