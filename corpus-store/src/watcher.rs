//! Follow collection files edited by other processes.
//!
//! A second `corpus` process (an admin editing plans while `corpus watch`
//! runs) writes straight to the collection files. The watcher reloads the
//! touched collection so live subscribers in this process see the change.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use corpus_core::Collection;

use crate::error::StoreError;
use crate::local::LocalStore;

/// Keeps the watch alive; dropping it stops reloading.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start reloading `store` whenever one of its collection files changes.
///
/// Must be called from within a tokio runtime.
pub fn watch_store_dir(store: Arc<LocalStore>) -> Result<StoreWatcher, StoreError> {
    let dir = store.dir().ok_or(StoreError::NotPersistent)?.to_path_buf();
    // Events arrive with canonical paths on some platforms.
    let dir = std::fs::canonicalize(&dir).unwrap_or(dir);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(dir = %dir.display(), "watching store directory");

    let task = tokio::spawn(reload_task(store, dir, event_rx));
    Ok(StoreWatcher {
        _watcher: watcher,
        task,
    })
}

async fn reload_task(
    store: Arc<LocalStore>,
    dir: PathBuf,
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
) {
    while let Some(first) = event_rx.recv().await {
        // Drain the burst a single atomic write produces (tmp create, rename).
        let mut touched = BTreeSet::new();
        collect(&dir, first, &mut touched);
        while let Ok(event) = event_rx.try_recv() {
            collect(&dir, event, &mut touched);
        }

        for collection in touched {
            match store.reload_collection(collection) {
                Ok(true) => tracing::info!(%collection, "reloaded collection after external write"),
                Ok(false) => {}
                Err(err) => tracing::warn!(%collection, error = %err, "collection reload failed"),
            }
        }
    }
}

fn collect(dir: &Path, event: notify::Result<Event>, touched: &mut BTreeSet<Collection>) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(error = %err, "watcher event error");
            return;
        }
    };
    if !is_relevant_event_kind(&event.kind) {
        return;
    }
    touched.extend(
        event
            .paths
            .iter()
            .filter_map(|path| collection_for_path(dir, path)),
    );
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// `<dir>/plans.json` maps to `Collection::Plans`; tmp files and strangers to `None`.
fn collection_for_path(dir: &Path, path: &Path) -> Option<Collection> {
    let parent = path.parent()?;
    if parent != dir && std::fs::canonicalize(parent).ok().as_deref() != Some(dir) {
        return None;
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Fields, Query};
    use crate::store::DocumentStore;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn collection_for_path_matches_only_collection_files() {
        let dir = Path::new("/srv/store");
        assert_eq!(
            collection_for_path(dir, &dir.join("plans.json")),
            Some(Collection::Plans)
        );
        assert_eq!(
            collection_for_path(dir, &dir.join("team.json")),
            Some(Collection::Team)
        );
        assert_eq!(collection_for_path(dir, &dir.join("plans.json.tmp")), None);
        assert_eq!(collection_for_path(dir, &dir.join(".plans.lock")), None);
        assert_eq!(collection_for_path(dir, &dir.join("notes.json")), None);
        assert_eq!(
            collection_for_path(dir, Path::new("/elsewhere/plans.json")),
            None
        );
    }

    #[test]
    fn remove_events_are_relevant() {
        assert!(is_relevant_event_kind(&EventKind::Remove(
            notify::event::RemoveKind::File
        )));
        assert!(!is_relevant_event_kind(&EventKind::Access(
            notify::event::AccessKind::Any
        )));
    }

    #[test]
    fn in_memory_store_cannot_be_watched() {
        let store = Arc::new(LocalStore::in_memory());
        assert!(matches!(
            watch_store_dir(store),
            Err(StoreError::NotPersistent)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn external_write_reaches_subscribers() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
        let _watcher = watch_store_dir(Arc::clone(&store)).unwrap();
        let mut sub = store
            .subscribe(Query::ascending(Collection::Team, "order"))
            .unwrap();
        assert!(sub.next_snapshot().await.unwrap().is_empty());

        let writer = LocalStore::open(tmp.path()).unwrap();
        let mut fields = Fields::new();
        fields.insert("order".into(), 0.into());
        writer.add(Collection::Team, fields).await.unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(10), sub.next_snapshot())
            .await
            .expect("reload within timeout")
            .unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
