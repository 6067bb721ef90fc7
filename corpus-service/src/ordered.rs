//! CRUD and rank management over an ordered collection.
//!
//! Used for both plans and team members. Display rank is the `order` field,
//! ascending. The store does not keep it unique or contiguous: creation
//! appends at `order = count`, deletion leaves gaps, and reordering swaps
//! the ranks of two neighbours.

use std::marker::PhantomData;
use std::sync::Arc;

use corpus_core::{Direction, Identified, OrderedRecord, RecordId};
use corpus_store::DocumentStore;

use crate::codec::{decode, record_query, to_fields};
use crate::error::ServiceError;

/// Result of [`OrderedCollection::reorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Ranks were swapped with this neighbour.
    Moved { with: RecordId },
    /// Already first (moving up) or last (moving down).
    Unchanged,
}

/// Stateless service over one ordered collection.
pub struct OrderedCollection<R> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for OrderedCollection<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<R: OrderedRecord> OrderedCollection<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Current records ascending by `order`, ties in insertion sequence.
    pub async fn list(&self) -> Result<Vec<Identified<R>>, ServiceError> {
        self.store
            .query(&record_query::<R>())
            .await?
            .into_iter()
            .map(decode::<R>)
            .collect()
    }

    pub async fn get(&self, id: &RecordId) -> Result<Identified<R>, ServiceError> {
        match self.store.get(R::COLLECTION, id).await? {
            Some(document) => decode(document),
            None => Err(self.not_found(id)),
        }
    }

    /// A blank record ranked after everything that exists now.
    pub async fn draft(&self) -> Result<R, ServiceError> {
        let mut record = R::default();
        record.set_order(self.count().await?);
        Ok(record)
    }

    /// Persist a new record at the end of the collection.
    ///
    /// Whatever `order` the draft carries is replaced by the count at
    /// submit time.
    pub async fn create(&self, mut record: R) -> Result<RecordId, ServiceError> {
        record.normalize();
        record.validate()?;
        record.set_order(self.count().await?);

        let id = self.store.add(R::COLLECTION, to_fields(&record)?).await?;
        tracing::info!(collection = %R::COLLECTION, %id, order = record.order(), "record created");
        Ok(id)
    }

    /// Merge the fields present in `patch` into an existing record.
    pub async fn update(&self, id: &RecordId, mut patch: R::Patch) -> Result<(), ServiceError> {
        R::normalize_patch(&mut patch);
        R::validate_patch(&patch)?;
        self.store
            .update(R::COLLECTION, id, to_fields(&patch)?)
            .await?;
        tracing::info!(collection = %R::COLLECTION, %id, "record updated");
        Ok(())
    }

    /// Remove a record permanently. Remaining ranks are left as they are.
    pub async fn delete(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.store.delete(R::COLLECTION, id).await?;
        tracing::info!(collection = %R::COLLECTION, %id, "record deleted");
        Ok(())
    }

    /// Swap ranks with the neighbour in `direction`.
    ///
    /// Two independent updates: the moved record takes the neighbour's
    /// rank, then the neighbour takes the moved record's former rank. If
    /// the second one fails both records share a rank until the next
    /// successful reorder; nothing is rolled back.
    pub async fn reorder(
        &self,
        id: &RecordId,
        direction: Direction,
    ) -> Result<ReorderOutcome, ServiceError> {
        let items = self.list().await?;
        let index = items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| self.not_found(id))?;

        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&next| next < items.len()),
        };
        let Some(neighbour) = neighbour else {
            tracing::debug!(collection = %R::COLLECTION, %id, %direction, "already at the edge");
            return Ok(ReorderOutcome::Unchanged);
        };

        let moved = &items[index];
        let other = &items[neighbour];
        let (moved_order, other_order) = (moved.record.order(), other.record.order());

        self.store
            .update(R::COLLECTION, &moved.id, to_fields(&R::order_patch(other_order))?)
            .await?;
        if let Err(err) = self
            .store
            .update(R::COLLECTION, &other.id, to_fields(&R::order_patch(moved_order))?)
            .await
        {
            tracing::warn!(
                collection = %R::COLLECTION,
                moved = %moved.id,
                other = %other.id,
                order = other_order,
                error = %err,
                "second half of swap failed; two records now share a rank"
            );
            return Err(err.into());
        }

        tracing::info!(
            collection = %R::COLLECTION,
            %id,
            with = %other.id,
            %direction,
            "records swapped"
        );
        Ok(ReorderOutcome::Moved {
            with: other.id.clone(),
        })
    }

    async fn count(&self) -> Result<u32, ServiceError> {
        let count = self.store.query(&record_query::<R>()).await?.len();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn not_found(&self, id: &RecordId) -> ServiceError {
        ServiceError::NotFound {
            collection: R::COLLECTION,
            id: id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_core::{Plan, PlanPatch, TeamMember};
    use corpus_store::LocalStore;

    fn plans() -> OrderedCollection<Plan> {
        OrderedCollection::new(Arc::new(LocalStore::in_memory()))
    }

    fn plan(name: &str) -> Plan {
        Plan {
            name: name.into(),
            price: "R$ 99".into(),
            ..Plan::default()
        }
    }

    #[tokio::test]
    async fn draft_is_ranked_after_existing_records() {
        let service = plans();
        assert_eq!(service.draft().await.unwrap().order, 0);
        service.create(plan("A")).await.unwrap();
        service.create(plan("B")).await.unwrap();
        assert_eq!(service.draft().await.unwrap().order, 2);
    }

    #[tokio::test]
    async fn create_overrides_draft_order() {
        let service = plans();
        let mut draft = plan("A");
        draft.order = 40;
        let id = service.create(draft).await.unwrap();
        assert_eq!(service.get(&id).await.unwrap().record.order, 0);
    }

    #[tokio::test]
    async fn invalid_record_never_reaches_store() {
        let service = plans();
        let err = service.create(plan("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_patch_strips_blank_features() {
        let service = plans();
        let id = service.create(plan("A")).await.unwrap();
        service
            .update(
                &id,
                PlanPatch {
                    features: Some(vec!["x".into(), " ".into(), "y".into()]),
                    ..PlanPatch::default()
                },
            )
            .await
            .unwrap();
        let stored = service.get(&id).await.unwrap().record;
        assert_eq!(stored.features, ["x", "y"]);
        assert_eq!(stored.name, "A");
    }

    #[tokio::test]
    async fn reorder_unknown_id_is_not_found() {
        let service = plans();
        service.create(plan("A")).await.unwrap();
        let err = service
            .reorder(&RecordId::from("nope"), Direction::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn team_member_with_bad_image_rejected() {
        let team: OrderedCollection<TeamMember> =
            OrderedCollection::new(Arc::new(LocalStore::in_memory()));
        let err = team
            .create(TeamMember {
                name: "Ana".into(),
                role: "Coach".into(),
                image: "ftp://x/y.png".into(),
                order: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
