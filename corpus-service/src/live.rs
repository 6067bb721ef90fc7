//! Live views: a consumer callback fed complete ordered snapshots.
//!
//! ```text
//! Idle ──mount──▶ Subscribing ──first snapshot──▶ Streaming ◀─┐
//!                      │                             │  └──────┘ snapshot
//!                      └──────unsubscribe / feed closed──▶ Unsubscribed
//! ```
//!
//! Snapshots are delivered while holding the handle's lock, so once
//! [`LiveHandle::unsubscribe`] returns no further callback can start.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tokio::task::JoinHandle;

use corpus_core::{Identified, Record};
use corpus_store::DocumentStore;

use crate::codec::{decode_lenient, record_query};
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Idle,
    Subscribing,
    Streaming,
    Unsubscribed,
}

// Reentrant so a callback may unsubscribe its own view.
type SharedState = Arc<ReentrantMutex<Cell<LiveState>>>;

/// Owns one live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct LiveHandle {
    state: SharedState,
    task: JoinHandle<()>,
}

impl LiveHandle {
    pub fn state(&self) -> LiveState {
        self.state.lock().get()
    }

    /// True until the first snapshot has been delivered.
    pub fn is_loading(&self) -> bool {
        matches!(self.state(), LiveState::Idle | LiveState::Subscribing)
    }

    pub fn is_active(&self) -> bool {
        self.state() != LiveState::Unsubscribed
    }

    /// Detach from the store. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        let state = self.state.lock();
        if state.get() != LiveState::Unsubscribed {
            state.set(LiveState::Unsubscribed);
            tracing::debug!("live view unsubscribed");
        }
        drop(state);
        self.task.abort();
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Subscribe to `R`'s display query and feed every snapshot to `on_snapshot`.
///
/// Documents that do not decode as `R` are skipped with a warning. Must be
/// called from within a tokio runtime.
pub fn mount<R, F>(store: &dyn DocumentStore, mut on_snapshot: F) -> Result<LiveHandle, ServiceError>
where
    R: Record,
    F: FnMut(Vec<Identified<R>>) + Send + 'static,
{
    let state: SharedState = Arc::new(ReentrantMutex::new(Cell::new(LiveState::Idle)));
    let mut subscription = store.subscribe(record_query::<R>())?;
    state.lock().set(LiveState::Subscribing);
    tracing::debug!(collection = %R::COLLECTION, "live view mounted");

    let task_state = Arc::clone(&state);
    let task = tokio::spawn(async move {
        while let Some(documents) = subscription.next_snapshot().await {
            let records = decode_lenient::<R>(documents);
            let state = task_state.lock();
            if state.get() == LiveState::Unsubscribed {
                return;
            }
            state.set(LiveState::Streaming);
            on_snapshot(records);
        }
        task_state.lock().set(LiveState::Unsubscribed);
        tracing::debug!(collection = %R::COLLECTION, "store feed closed");
    });

    Ok(LiveHandle { state, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::Plan;
    use corpus_store::LocalStore;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn loading_until_first_snapshot() {
        let store = LocalStore::in_memory();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = mount::<Plan, _>(&store, move |snapshot| {
            let _ = tx.send(snapshot.len());
        })
        .unwrap();
        assert_eq!(rx.recv().await, Some(0));
        assert!(!handle.is_loading());
        assert_eq!(handle.state(), LiveState::Streaming);
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let store = LocalStore::in_memory();
        let handle = mount::<Plan, _>(&store, |_| {}).unwrap();
        handle.unsubscribe();
        handle.unsubscribe();
        assert_eq!(handle.state(), LiveState::Unsubscribed);
        assert!(!handle.is_active());
    }
}
