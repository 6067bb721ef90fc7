//! Ordered collection CRUD and reorder protocol against a real store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use corpus_core::{Collection, Direction, Plan, PlanPatch, RecordId, TeamMember};
use corpus_service::{OrderedCollection, ReorderOutcome, ServiceError};
use corpus_store::{
    Document, DocumentStore, Fields, LocalStore, Query, StoreError, Subscription,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn plan(name: &str, features: &[&str]) -> Plan {
    Plan {
        name: name.into(),
        price: "R$ 129,00/mês".into(),
        features: features.iter().map(|f| f.to_string()).collect(),
        ..Plan::default()
    }
}

fn member(name: &str) -> TeamMember {
    TeamMember {
        name: name.into(),
        role: "Personal Trainer".into(),
        image: String::new(),
        order: 0,
    }
}

async fn orders_by_id(service: &OrderedCollection<TeamMember>, ids: &[RecordId]) -> Vec<u32> {
    let mut orders = Vec::new();
    for id in ids {
        orders.push(service.get(id).await.expect("get").record.order);
    }
    orders
}

/// Delegates to a [`LocalStore`], failing the `nth` update (1-based) or
/// every add when asked to.
struct FaultyStore {
    inner: LocalStore,
    updates: AtomicUsize,
    fail_update: usize,
    fail_adds: bool,
}

impl FaultyStore {
    fn failing_update(nth: usize) -> Self {
        Self {
            inner: LocalStore::in_memory(),
            updates: AtomicUsize::new(0),
            fail_update: nth,
            fail_adds: false,
        }
    }

    fn failing_adds() -> Self {
        Self {
            fail_adds: true,
            ..Self::failing_update(0)
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn add(&self, collection: Collection, fields: Fields) -> Result<RecordId, StoreError> {
        if self.fail_adds {
            return Err(StoreError::Unavailable("network down".into()));
        }
        self.inner.add(collection, fields).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let nth = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if nth == self.fail_update {
            return Err(StoreError::Unavailable("write rejected".into()));
        }
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn get(
        &self,
        collection: Collection,
        id: &RecordId,
    ) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.inner.query(query).await
    }

    fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        self.inner.subscribe(query)
    }
}

// ---------------------------------------------------------------------------
// 1. Create / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_strips_blank_features_and_appends() {
    let service: OrderedCollection<Plan> = OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let mensal = service.create(plan("Mensal", &["Acesso livre"])).await.unwrap();
    let trimestral = service.create(plan("Trimestral", &[])).await.unwrap();

    let anual = service
        .create(plan("Anual", &["A", "", "  "]))
        .await
        .unwrap();
    let stored = service.get(&anual).await.unwrap().record;
    assert_eq!(stored.features, ["A"]);
    assert_eq!(stored.order, 2);

    service.delete(&anual).await.unwrap();
    let remaining: Vec<(RecordId, u32)> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| (p.id, p.record.order))
        .collect();
    assert_eq!(remaining, [(mensal, 0), (trimestral, 1)]);
}

#[tokio::test]
async fn deleting_leaves_gaps_and_next_create_uses_count() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let a = service.create(member("Ana")).await.unwrap();
    service.create(member("Bruno")).await.unwrap();
    service.create(member("Caio")).await.unwrap();
    service.delete(&a).await.unwrap();

    // Two records left with orders 1 and 2; the next one lands on 2 as well.
    let d = service.create(member("Duda")).await.unwrap();
    assert_eq!(service.get(&d).await.unwrap().record.order, 2);

    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.record.name)
        .collect();
    assert_eq!(names, ["Bruno", "Caio", "Duda"]);
}

#[tokio::test]
async fn create_failure_is_persistence_error() {
    let service: OrderedCollection<Plan> =
        OrderedCollection::new(Arc::new(FaultyStore::failing_adds()));
    let err = service.create(plan("Mensal", &[])).await.unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(_)), "got: {err}");
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_of_vanished_record_are_not_found() {
    let service: OrderedCollection<Plan> = OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let id = service.create(plan("Mensal", &[])).await.unwrap();
    service.delete(&id).await.unwrap();

    let err = service
        .update(
            &id,
            PlanPatch {
                price: Some("R$ 1".into()),
                ..PlanPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }), "got: {err}");

    let err = service.delete(&id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }), "got: {err}");
}

#[tokio::test]
async fn blank_name_in_patch_is_rejected() {
    let service: OrderedCollection<Plan> = OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let id = service.create(plan("Mensal", &[])).await.unwrap();
    let err = service
        .update(
            &id,
            PlanPatch {
                name: Some(" ".into()),
                ..PlanPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(service.get(&id).await.unwrap().record.name, "Mensal");
}

// ---------------------------------------------------------------------------
// 2. Reorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn move_middle_up_swaps_with_first() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let mut ids = Vec::new();
    for name in ["Ana", "Bruno", "Caio"] {
        ids.push(service.create(member(name)).await.unwrap());
    }

    let outcome = service.reorder(&ids[1], Direction::Up).await.unwrap();
    assert_eq!(
        outcome,
        ReorderOutcome::Moved {
            with: ids[0].clone()
        }
    );
    assert_eq!(orders_by_id(&service, &ids).await, [1, 0, 2]);

    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.record.name)
        .collect();
    assert_eq!(names, ["Bruno", "Ana", "Caio"]);
}

#[tokio::test]
async fn edges_are_no_ops() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let mut ids = Vec::new();
    for name in ["Ana", "Bruno", "Caio"] {
        ids.push(service.create(member(name)).await.unwrap());
    }

    assert_eq!(
        service.reorder(&ids[0], Direction::Up).await.unwrap(),
        ReorderOutcome::Unchanged
    );
    assert_eq!(
        service.reorder(&ids[2], Direction::Down).await.unwrap(),
        ReorderOutcome::Unchanged
    );
    assert_eq!(orders_by_id(&service, &ids).await, [0, 1, 2]);
}

#[tokio::test]
async fn reorder_swaps_actual_values_across_gaps() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(LocalStore::in_memory()));
    let mut ids = Vec::new();
    for name in ["Ana", "Bruno", "Caio", "Duda"] {
        ids.push(service.create(member(name)).await.unwrap());
    }
    service.delete(&ids[1]).await.unwrap();
    let ids = vec![ids[0].clone(), ids[2].clone(), ids[3].clone()];

    // Orders are now [0, 2, 3]; moving the first down swaps 0 and 2.
    service.reorder(&ids[0], Direction::Down).await.unwrap();
    assert_eq!(orders_by_id(&service, &ids).await, [2, 0, 3]);
}

#[tokio::test]
async fn failed_second_step_leaves_duplicate_rank() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(FaultyStore::failing_update(2)));
    let mut ids = Vec::new();
    for name in ["Ana", "Bruno"] {
        ids.push(service.create(member(name)).await.unwrap());
    }

    let err = service.reorder(&ids[1], Direction::Up).await.unwrap_err();
    assert!(matches!(err, ServiceError::Persistence(_)), "got: {err}");
    // First half landed, second did not: both now hold order 0.
    assert_eq!(orders_by_id(&service, &ids).await, [0, 0]);
}

#[tokio::test]
async fn failed_first_step_changes_nothing() {
    let service: OrderedCollection<TeamMember> =
        OrderedCollection::new(Arc::new(FaultyStore::failing_update(1)));
    let mut ids = Vec::new();
    for name in ["Ana", "Bruno"] {
        ids.push(service.create(member(name)).await.unwrap());
    }

    assert!(service.reorder(&ids[0], Direction::Down).await.is_err());
    assert_eq!(orders_by_id(&service, &ids).await, [0, 1]);
}
