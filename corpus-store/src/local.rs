//! File-backed document store.
//!
//! Each collection lives in `<dir>/<collection>.json` as an array of
//! documents in insertion sequence. A mutation takes an exclusive advisory
//! lock on `<dir>/.<collection>.lock`, re-reads the file so writes from other
//! processes are kept, applies the change, writes atomically, and only then
//! commits and publishes. A failed write leaves both memory and disk as they
//! were.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use corpus_core::{Collection, RecordId};

use crate::document::{Document, Fields, Query};
use crate::error::{io_err, StoreError};
use crate::persist::{read_json, write_json_atomic};
use crate::store::{CollectionFeed, DocumentStore, Subscription};

type Feed = watch::Sender<Arc<Vec<Document>>>;

/// `<dir>/<collection>.json`
pub fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

/// `<dir>/.<collection>.lock`
fn lock_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!(".{collection}.lock"))
}

/// Block until this process holds the collection's write lock. Released when
/// the returned file is dropped.
fn lock_collection(dir: &Path, collection: Collection) -> Result<File, StoreError> {
    let path = lock_path(dir, collection);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(|e| io_err(&path, e))?;
    file.lock_exclusive().map_err(|e| io_err(&path, e))?;
    Ok(file)
}

#[derive(Debug)]
pub struct LocalStore {
    dir: Option<PathBuf>,
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
    feeds: HashMap<Collection, Feed>,
}

impl LocalStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::with_contents(None, HashMap::new())
    }

    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// Missing collection files read as empty; a file that does not parse
    /// is an error rather than silently dropped data.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

        let mut contents = HashMap::new();
        for collection in Collection::ALL {
            let documents: Vec<Document> =
                read_json(&collection_path(&dir, collection))?.unwrap_or_default();
            tracing::debug!(%collection, count = documents.len(), "loaded collection");
            contents.insert(collection, documents);
        }
        Ok(Self::with_contents(Some(dir), contents))
    }

    fn with_contents(dir: Option<PathBuf>, mut contents: HashMap<Collection, Vec<Document>>) -> Self {
        let mut feeds = HashMap::new();
        for collection in Collection::ALL {
            let documents = contents.entry(collection).or_default();
            let (tx, _rx) = watch::channel(Arc::new(documents.clone()));
            feeds.insert(collection, tx);
        }
        Self {
            dir,
            collections: Mutex::new(contents),
            feeds,
        }
    }

    /// Backing directory, if this store is persistent.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Raw feed of a collection in insertion sequence.
    pub fn feed(&self, collection: Collection) -> Result<CollectionFeed, StoreError> {
        self.feeds
            .get(&collection)
            .map(watch::Sender::subscribe)
            .ok_or_else(|| StoreError::Unavailable(format!("no feed for '{collection}'")))
    }

    /// Re-read one collection file written by another process.
    ///
    /// Publishes and returns `true` only when the contents changed.
    pub fn reload_collection(&self, collection: Collection) -> Result<bool, StoreError> {
        let dir = self.dir.as_deref().ok_or(StoreError::NotPersistent)?;
        let on_disk: Vec<Document> =
            read_json(&collection_path(dir, collection))?.unwrap_or_default();

        let mut collections = self.collections.lock();
        let current = collections.entry(collection).or_default();
        if *current == on_disk {
            return Ok(false);
        }
        tracing::debug!(%collection, count = on_disk.len(), "collection changed on disk");
        *current = on_disk;
        self.publish(collection, current);
        Ok(true)
    }

    /// Apply `change` to the latest contents of the collection, persist them,
    /// then commit.
    ///
    /// Persistent stores start from the file, not from memory, so a document
    /// written by another process since the last load is never overwritten.
    fn mutate<T>(
        &self,
        collection: Collection,
        change: impl FnOnce(&mut Vec<Document>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut collections = self.collections.lock();
        let current = collections.entry(collection).or_default();

        let _lock = match &self.dir {
            Some(dir) => Some(lock_collection(dir, collection)?),
            None => None,
        };
        let mut next = match &self.dir {
            Some(dir) => read_json(&collection_path(dir, collection))?.unwrap_or_default(),
            None => current.clone(),
        };
        let outcome = change(&mut next)?;
        if let Some(dir) = &self.dir {
            write_json_atomic(&collection_path(dir, collection), &next)?;
        }
        *current = next;
        // Published under the lock so feeds never observe writes out of order.
        self.publish(collection, current);
        Ok(outcome)
    }

    fn publish(&self, collection: Collection, documents: &[Document]) {
        if let Some(feed) = self.feeds.get(&collection) {
            feed.send_replace(Arc::new(documents.to_vec()));
        }
    }
}

fn not_found(collection: Collection, id: &RecordId) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.clone(),
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn add(&self, collection: Collection, fields: Fields) -> Result<RecordId, StoreError> {
        let id = RecordId(Uuid::new_v4().simple().to_string());
        self.mutate(collection, |documents| {
            documents.push(Document {
                id: id.clone(),
                fields,
            });
            Ok(())
        })?;
        tracing::debug!(%collection, %id, "document added");
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.mutate(collection, |documents| {
            let document = documents
                .iter_mut()
                .find(|doc| &doc.id == id)
                .ok_or_else(|| not_found(collection, id))?;
            document.fields.extend(fields);
            Ok(())
        })?;
        tracing::debug!(%collection, %id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError> {
        self.mutate(collection, |documents| {
            let index = documents
                .iter()
                .position(|doc| &doc.id == id)
                .ok_or_else(|| not_found(collection, id))?;
            documents.remove(index);
            Ok(())
        })?;
        tracing::debug!(%collection, %id, "document deleted");
        Ok(())
    }

    async fn get(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock();
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|doc| &doc.id == id))
            .cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock();
        Ok(collections
            .get(&query.collection)
            .map(|documents| query.apply(documents))
            .unwrap_or_default())
    }

    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let feed = self.feed(query.collection)?;
        Ok(Subscription::new(query, feed))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
