//! # Core Store Framework
//!
//! This module defines the generic building blocks every in-process store is made of.
//!
//! ## Key Types
//!
//! - [`StoreEntity`]: The trait that all stored record types must implement.
//! - [`StoreActor`]: The generic actor that owns a collection of records.
//! - [`StoreClient`]: The generic client for communicating with a store actor.
//! - [`StoreError`]: Common errors (e.g., Closed, Duplicate, NotFound).

use std::collections::{HashMap, VecDeque};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any record type must implement to be kept by a [`StoreActor`].
///
/// # Architecture Note
/// The relational headers, the document line items, the cache entries and the broker log
/// are all "a map of records behind a channel". By describing a record through this
/// contract, the message loop is written *once* and reused for every store.
///
/// Associated types keep each store honest: an item store only accepts item payloads,
/// and a header update can never be sent to the cache.
///
/// # Provided Methods
/// - [`StoreEntity::unique_key`] - secondary unique index (default: none)
/// - [`StoreEntity::is_expired`] - time-based eviction (default: never)
pub trait StoreEntity: Clone + Send + Sync + 'static {
    /// The primary key of the record (e.g., `OrderId`, a cache key, a log offset).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// The data required to modify an existing record.
    type Update: Send + Sync + Debug;

    /// Query predicate used by `find`.
    type Filter: Send + Sync + Debug;

    /// Construct the full record from its key and payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, String>;

    /// Apply an update in place.
    fn apply_update(&mut self, update: Self::Update) -> Result<(), String>;

    /// Whether this record satisfies `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Value of the unique secondary index, if the store enforces one.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Expired records are treated as absent and evicted on access.
    fn is_expired(&self) -> bool {
        false
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur while talking to a store.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Duplicate key: {0}")]
    Duplicate(String),
    #[error("Record rejected: {0}")]
    Rejected(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Type alias for the one-shot response channel used by store actors.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Internal message type sent to a [`StoreActor`].
///
/// The variants mirror the operations the external stores offer: keyed inserts where the
/// store assigns identity, batch inserts, caller-keyed writes (`Put`, used by the cache),
/// point reads, updates, filtered scans, and the `count`/`clear` maintenance pair.
#[derive(Debug)]
pub enum StoreRequest<T: StoreEntity> {
    Insert {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    InsertMany {
        batch: Vec<T::Create>,
        respond_to: Response<Vec<T::Id>>,
    },
    Put {
        id: T::Id,
        params: T::Create,
        respond_to: Response<()>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Find {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Count {
        respond_to: Response<usize>,
    },
    Clear {
        respond_to: Response<usize>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

type IdGenerator<Id> = Box<dyn Fn() -> Id + Send + Sync>;

/// The generic actor that owns one store's records.
///
/// # Architecture Note
/// This struct is the "Server" half. It owns the records, the unique index and the
/// receiver end of the channel, and processes requests one at a time. Many requests
/// may be in flight from different tasks, but no `Mutex` is needed around `records`.
///
/// Iteration order of `find` follows the backing `HashMap`, so callers must not rely
/// on insertion order.
///
/// Identities drawn for an insert that is then rejected are handed out again by the next
/// insert, so a counter-based generator leaves no gaps.
pub struct StoreActor<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: HashMap<T::Id, T>,
    unique: HashMap<String, T::Id>,
    next_id_fn: Option<IdGenerator<T::Id>>,
    recycled: VecDeque<T::Id>,
}

impl<T: StoreEntity> StoreActor<T> {
    /// A store that assigns identities itself on `insert`.
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, StoreClient<T>) {
        Self::build(buffer_size, Some(Box::new(next_id_fn)))
    }

    /// A store where every record is written under a caller-supplied key (`put`).
    pub fn keyed(buffer_size: usize) -> (Self, StoreClient<T>) {
        Self::build(buffer_size, None)
    }

    fn build(buffer_size: usize, next_id_fn: Option<IdGenerator<T::Id>>) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: HashMap::new(),
            unique: HashMap::new(),
            next_id_fn,
            recycled: VecDeque::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the store's event loop until every client has been dropped.
    pub async fn run(mut self) {
        // "Order" instead of "order_coordinator::model::order::Order"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { params, respond_to } => {
                    debug!(entity_type, ?params, "Insert");
                    let result = self.insert(params);
                    match &result {
                        Ok(id) => info!(entity_type, %id, size = self.records.len(), "Inserted"),
                        Err(e) => warn!(entity_type, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::InsertMany { batch, respond_to } => {
                    debug!(entity_type, count = batch.len(), "InsertMany");
                    let result = self.insert_many(batch);
                    match &result {
                        Ok(ids) => info!(entity_type, inserted = ids.len(), size = self.records.len(), "Batch inserted"),
                        Err(e) => warn!(entity_type, error = %e, "Batch rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Put { id, params, respond_to } => {
                    debug!(entity_type, %id, "Put");
                    let result = self.put(id.clone(), params);
                    if let Err(e) = &result {
                        warn!(entity_type, %id, error = %e, "Put failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Get { id, respond_to } => {
                    let record = self.live(&id).cloned();
                    debug!(entity_type, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::Update { id, update, respond_to } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = match self.live_mut(&id) {
                        Some(record) => record
                            .apply_update(update)
                            .map(|()| record.clone())
                            .map_err(StoreError::Rejected),
                        None => Err(StoreError::NotFound(id.to_string())),
                    };
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Find { filter, respond_to } => {
                    self.evict_expired();
                    let found: Vec<T> = self
                        .records
                        .values()
                        .filter(|record| record.matches(&filter))
                        .cloned()
                        .collect();
                    debug!(entity_type, ?filter, found = found.len(), "Find");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::Count { respond_to } => {
                    self.evict_expired();
                    let _ = respond_to.send(Ok(self.records.len()));
                }
                StoreRequest::Clear { respond_to } => {
                    let removed = self.records.len();
                    self.records.clear();
                    self.unique.clear();
                    info!(entity_type, removed, "Cleared");
                    let _ = respond_to.send(Ok(removed));
                }
            }
        }

        info!(entity_type, size = self.records.len(), "Shutdown");
    }

    fn next_id(&mut self) -> Result<T::Id, StoreError> {
        if let Some(id) = self.recycled.pop_front() {
            return Ok(id);
        }
        self.next_id_fn
            .as_ref()
            .map(|next| next())
            .ok_or_else(|| StoreError::Rejected("store does not assign identities".into()))
    }

    /// Returns unused identities, keeping their original order.
    fn recycle(&mut self, ids: Vec<T::Id>) {
        for id in ids.into_iter().rev() {
            self.recycled.push_front(id);
        }
    }

    fn insert(&mut self, params: T::Create) -> Result<T::Id, StoreError> {
        let id = self.next_id()?;
        let admitted = T::from_create_params(id.clone(), params)
            .map_err(StoreError::Rejected)
            .and_then(|record| match record.unique_key() {
                Some(key) if self.unique.contains_key(&key) => Err(StoreError::Duplicate(key)),
                key => Ok((record, key)),
            });

        match admitted {
            Ok((record, key)) => {
                if let Some(key) = key {
                    self.unique.insert(key, id.clone());
                }
                self.records.insert(id.clone(), record);
                Ok(id)
            }
            Err(e) => {
                self.recycle(vec![id]);
                Err(e)
            }
        }
    }

    /// All-or-nothing: every record is built and checked before any is stored.
    fn insert_many(&mut self, batch: Vec<T::Create>) -> Result<Vec<T::Id>, StoreError> {
        let mut drawn = Vec::with_capacity(batch.len());
        match self.stage(batch, &mut drawn) {
            Ok((staged, batch_keys)) => {
                self.unique.extend(batch_keys);
                self.records.extend(staged);
                Ok(drawn)
            }
            Err(e) => {
                self.recycle(drawn);
                Err(e)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn stage(
        &mut self,
        batch: Vec<T::Create>,
        drawn: &mut Vec<T::Id>,
    ) -> Result<(Vec<(T::Id, T)>, HashMap<String, T::Id>), StoreError> {
        let mut staged = Vec::with_capacity(batch.len());
        let mut batch_keys = HashMap::new();
        for params in batch {
            let id = self.next_id()?;
            drawn.push(id.clone());
            let record = T::from_create_params(id.clone(), params).map_err(StoreError::Rejected)?;
            if let Some(key) = record.unique_key() {
                if self.unique.contains_key(&key) || batch_keys.contains_key(&key) {
                    return Err(StoreError::Duplicate(key));
                }
                batch_keys.insert(key, id.clone());
            }
            staged.push((id, record));
        }
        Ok((staged, batch_keys))
    }

    fn put(&mut self, id: T::Id, params: T::Create) -> Result<(), StoreError> {
        // Expired entries are freed on every write, not only when their own key is read.
        self.evict_expired();
        let record = T::from_create_params(id.clone(), params).map_err(StoreError::Rejected)?;
        let key = record.unique_key();
        if let Some(key) = &key {
            if self.unique.get(key).is_some_and(|owner| owner != &id) {
                return Err(StoreError::Duplicate(key.clone()));
            }
        }
        self.remove(&id);
        if let Some(key) = key {
            self.unique.insert(key, id.clone());
        }
        self.records.insert(id, record);
        Ok(())
    }

    fn live(&mut self, id: &T::Id) -> Option<&T> {
        self.evict_if_expired(id);
        self.records.get(id)
    }

    fn live_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.evict_if_expired(id);
        self.records.get_mut(id)
    }

    fn evict_if_expired(&mut self, id: &T::Id) {
        if self.records.get(id).is_some_and(|record| record.is_expired()) {
            self.remove(id);
        }
    }

    fn evict_expired(&mut self) {
        let expired: Vec<T::Id> = self
            .records
            .iter()
            .filter(|(_, record)| record.is_expired())
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            self.remove(&id);
        }
    }

    fn remove(&mut self, id: &T::Id) {
        if let Some(record) = self.records.remove(id) {
            if let Some(key) = record.unique_key() {
                self.unique.remove(&key);
            }
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a [`StoreActor`].
///
/// Holds only a sender, so cloning is cheap and every request task can own one.
#[derive(Clone)]
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, params: T::Create) -> Result<T::Id, StoreError> {
        self.request(|respond_to| StoreRequest::Insert { params, respond_to })
            .await
    }

    pub async fn insert_many(&self, batch: Vec<T::Create>) -> Result<Vec<T::Id>, StoreError> {
        self.request(|respond_to| StoreRequest::InsertMany { batch, respond_to })
            .await
    }

    pub async fn put(&self, id: T::Id, params: T::Create) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Put { id, params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Update { id, update, respond_to })
            .await
    }

    pub async fn find(&self, filter: T::Filter) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Find { filter, respond_to })
            .await
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::Count { respond_to })
            .await
    }

    pub async fn clear(&self) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::Clear { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    // --- Record Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Sku {
        id: u64,
        code: String,
        stock: u32,
        expires_at: Option<Instant>,
    }

    #[derive(Debug)]
    struct SkuCreate {
        code: String,
        stock: u32,
        ttl: Option<Duration>,
    }

    #[derive(Debug)]
    struct SkuUpdate {
        stock: u32,
    }

    #[derive(Debug)]
    struct InStock;

    impl StoreEntity for Sku {
        type Id = u64;
        type Create = SkuCreate;
        type Update = SkuUpdate;
        type Filter = InStock;

        fn from_create_params(id: u64, params: SkuCreate) -> Result<Self, String> {
            if params.code.is_empty() {
                return Err("code required".into());
            }
            Ok(Self {
                id,
                code: params.code,
                stock: params.stock,
                expires_at: params.ttl.map(|ttl| Instant::now() + ttl),
            })
        }

        fn apply_update(&mut self, update: SkuUpdate) -> Result<(), String> {
            self.stock = update.stock;
            Ok(())
        }

        fn matches(&self, _filter: &InStock) -> bool {
            self.stock > 0
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.code.clone())
        }

        fn is_expired(&self) -> bool {
            self.expires_at.is_some_and(|at| Instant::now() >= at)
        }
    }

    fn sku(code: &str, stock: u32) -> SkuCreate {
        SkuCreate { code: code.into(), stock, ttl: None }
    }

    fn spawn_store() -> StoreClient<Sku> {
        let counter = Arc::new(AtomicU64::new(1));
        let (actor, client) = StoreActor::new(10, move || counter.fetch_add(1, Ordering::SeqCst));
        tokio::spawn(actor.run());
        client
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_insert_update_find_count_clear() {
        let client = spawn_store();

        let a = client.insert(sku("A", 3)).await.unwrap();
        let b = client.insert(sku("B", 0)).await.unwrap();
        assert_ne!(a, b);

        let updated = client.update(b, SkuUpdate { stock: 7 }).await.unwrap();
        assert_eq!(updated.stock, 7);

        let in_stock = client.find(InStock).await.unwrap();
        assert_eq!(in_stock.len(), 2);

        assert_eq!(client.count().await.unwrap(), 2);
        assert_eq!(client.clear().await.unwrap(), 2);
        assert!(client.get(a).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let client = spawn_store();
        let result = client.update(42, SkuUpdate { stock: 1 }).await;
        assert_eq!(result, Err(StoreError::NotFound("42".into())));
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let client = spawn_store();
        client.insert(sku("A", 1)).await.unwrap();

        let result = client.insert(sku("A", 2)).await;
        assert_eq!(result, Err(StoreError::Duplicate("A".into())));
        assert_eq!(client.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let client = spawn_store();

        let result = client.insert_many(vec![sku("A", 1), sku("B", 1), sku("A", 2)]).await;
        assert_eq!(result, Err(StoreError::Duplicate("A".into())));
        assert_eq!(client.count().await.unwrap(), 0);

        let ids = client.insert_many(vec![sku("A", 1), sku("B", 1)]).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(client.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejected_inserts_leave_no_gaps() {
        let client = spawn_store();

        assert_eq!(client.insert(sku("A", 1)).await, Ok(1));
        assert!(client.insert(sku("A", 2)).await.is_err());
        assert!(client.insert(sku("", 2)).await.is_err());
        assert!(client.insert_many(vec![sku("B", 1), sku("A", 1)]).await.is_err());

        assert_eq!(client.insert(sku("B", 1)).await, Ok(2));
        assert_eq!(client.insert_many(vec![sku("C", 1), sku("D", 1)]).await, Ok(vec![3, 4]));
    }

    #[tokio::test]
    async fn test_rejected_payload() {
        let client = spawn_store();
        let result = client.insert(sku("", 1)).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_keyed_store_refuses_generated_inserts() {
        let (actor, client) = StoreActor::<Sku>::keyed(10);
        tokio::spawn(actor.run());

        assert!(matches!(client.insert(sku("A", 1)).await, Err(StoreError::Rejected(_))));

        client.put(9, sku("A", 1)).await.unwrap();
        client.put(9, sku("A2", 4)).await.unwrap();
        let record = client.get(9).await.unwrap().unwrap();
        assert_eq!(record.code, "A2");
        assert_eq!(client.count().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_records_are_absent() {
        let (actor, client) = StoreActor::<Sku>::keyed(10);
        tokio::spawn(actor.run());

        let params = SkuCreate { code: "A".into(), stock: 1, ttl: Some(Duration::from_secs(5)) };
        client.put(1, params).await.unwrap();
        assert!(client.get(1).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(client.get(1).await.unwrap().is_none());
        assert_eq!(client.count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_free_expired_records() {
        let (mut actor, _client) = StoreActor::<Sku>::keyed(10);
        let ttl = Some(Duration::from_secs(120));

        for id in 0..1000 {
            let params = SkuCreate { code: format!("S{id}"), stock: 1, ttl };
            actor.put(id, params).unwrap();
        }
        assert_eq!(actor.records.len(), 1000);

        tokio::time::advance(Duration::from_secs(3600)).await;
        actor.put(1000, SkuCreate { code: "fresh".into(), stock: 1, ttl }).unwrap();

        assert_eq!(actor.records.len(), 1);
        assert_eq!(actor.unique.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_store() {
        let (actor, client) = StoreActor::<Sku>::keyed(10);
        drop(actor);
        assert_eq!(client.count().await, Err(StoreError::Closed));
    }
}
