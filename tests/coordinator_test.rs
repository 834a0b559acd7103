//! Coordinators against scripted stores.
//!
//! The real publisher and in-process broker are used throughout; the three stores are
//! [`MockStore`]s so individual steps can be made to fail.

use async_trait::async_trait;
use order_coordinator::broker_actor::{self, InMemoryBroker};
use order_coordinator::cache_actor::CacheEntry;
use order_coordinator::clients::{CacheClient, ItemStoreClient, OrderStoreClient};
use order_coordinator::coordinator::{
    OrderCreationCoordinator, OrderError, OrderRetrievalCoordinator, OrderService,
};
use order_coordinator::framework::mock::MockStore;
use order_coordinator::framework::StoreError;
use order_coordinator::model::{
    cache_key, ItemId, NewOrderItem, Order, OrderId, OrderItem, OrderStatus, OrderView,
};
use order_coordinator::publisher::{
    DeliveryReport, EventPublisher, EventTransport, OutboundMessage, ProducerSettings, PublishError,
    TransportError,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const TTL: Duration = Duration::from_secs(120);

struct RejectingTransport;

#[async_trait]
impl EventTransport for RejectingTransport {
    async fn send(&self, _message: &OutboundMessage) -> Result<DeliveryReport, TransportError> {
        Err(TransportError::Rejected("topic authorization failed".into()))
    }
}

struct Mocks {
    orders: MockStore<Order>,
    items: MockStore<OrderItem>,
    cache: MockStore<CacheEntry>,
}

impl Mocks {
    fn new() -> Self {
        Self {
            orders: MockStore::new(),
            items: MockStore::new(),
            cache: MockStore::new(),
        }
    }

    fn service(&self, transport: Arc<dyn EventTransport>) -> OrderService {
        let orders = OrderStoreClient::new(self.orders.client());
        let items = ItemStoreClient::new(self.items.client());
        let cache = CacheClient::new(self.cache.client());
        let publisher = Arc::new(EventPublisher::new(transport, ProducerSettings::default()));

        let creation =
            OrderCreationCoordinator::new(orders.clone(), items.clone(), cache.clone(), publisher, "orders", TTL);
        let retrieval = OrderRetrievalCoordinator::new(orders, items, cache, TTL);
        OrderService::new(creation, retrieval)
    }

    fn verify(&self) {
        self.orders.verify();
        self.items.verify();
        self.cache.verify();
    }
}

fn spawn_broker() -> InMemoryBroker {
    let (actor, broker) = broker_actor::new(16);
    tokio::spawn(actor.run());
    broker
}

fn widget() -> Vec<NewOrderItem> {
    vec![NewOrderItem::new("PROD001", "Widget", 2, Decimal::new(1050, 2))]
}

fn created_header(id: OrderId, total: Decimal) -> Order {
    let mut order = Order::new(id, 123);
    order.status = OrderStatus::Created;
    order.total = total;
    order
}

fn stored_item(order_id: OrderId) -> OrderItem {
    OrderItem::new(ItemId(1), widget().remove(0).for_order(order_id))
}

fn cached(view: &OrderView) -> CacheEntry {
    CacheEntry {
        key: view.cache_key(),
        payload: serde_json::to_vec(view).unwrap(),
        expires_at: Instant::now() + TTL,
    }
}

#[tokio::test]
async fn test_invalid_request_touches_no_store() {
    let mocks = Mocks::new();
    let broker = spawn_broker();
    let service = mocks.service(Arc::new(broker.clone()));
    let cancel = CancellationToken::new();

    let empty = service.create_order(123, vec![], &cancel).await;
    assert!(matches!(empty, Err(OrderError::Validation(_))));

    let zero_quantity = vec![NewOrderItem::new("PROD001", "Widget", 0, Decimal::ONE)];
    let result = service.create_order(123, zero_quantity, &cancel).await;
    assert!(matches!(result, Err(OrderError::Validation(_))));

    let repeated = vec![
        NewOrderItem::new("PROD001", "Widget", 1, Decimal::ONE),
        NewOrderItem::new("PROD001", "Widget", 2, Decimal::ONE),
    ];
    let result = service.create_order(123, repeated, &cancel).await;
    assert!(matches!(result, Err(OrderError::Validation(_))));

    assert!(mocks.orders.received().is_empty());
    assert!(mocks.items.received().is_empty());
    assert!(mocks.cache.received().is_empty());
    assert!(broker.records("orders").await.unwrap().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_item_failure_leaves_header_pending() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    mocks.orders.expect_insert().return_ok(id);
    mocks
        .items
        .expect_insert_many()
        .return_err(StoreError::Unavailable("connection refused".into()));

    let broker = spawn_broker();
    let service = mocks.service(Arc::new(broker.clone()));
    let result = service.create_order(123, widget(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::StorageUnavailable(_))));
    // No compensation and no total/status update
    assert_eq!(mocks.orders.received(), vec!["insert"]);
    assert!(mocks.cache.received().is_empty());
    assert!(broker.records("orders").await.unwrap().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_unique_index_violation_is_a_constraint_error() {
    let mut mocks = Mocks::new();
    mocks.orders.expect_insert().return_ok(OrderId::new_v4());
    mocks
        .items
        .expect_insert_many()
        .return_err(StoreError::Duplicate("order/PROD001".into()));

    let service = mocks.service(Arc::new(spawn_broker()));
    let result = service.create_order(123, widget(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::ConstraintViolation(_))));
    mocks.verify();
}

#[tokio::test]
async fn test_header_insert_failure_stops_creation() {
    let mut mocks = Mocks::new();
    mocks.orders.expect_insert().return_err(StoreError::Closed);

    let service = mocks.service(Arc::new(spawn_broker()));
    let result = service.create_order(123, widget(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::StorageUnavailable(StoreError::Closed))));
    assert!(mocks.items.received().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_header_update_failure_leaves_items_and_pending_header() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    mocks.orders.expect_insert().return_ok(id);
    mocks.items.expect_insert_many().return_ok(vec![ItemId(1)]);
    mocks
        .orders
        .expect_update()
        .return_err(StoreError::Unavailable("primary failover".into()));

    let broker = spawn_broker();
    let service = mocks.service(Arc::new(broker.clone()));
    let result = service.create_order(123, widget(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::StorageUnavailable(_))));
    // Items stay stored; nothing is cached or published
    assert_eq!(mocks.orders.received(), vec!["insert", "update"]);
    assert_eq!(mocks.items.received(), vec!["insert_many"]);
    assert!(mocks.cache.received().is_empty());
    assert!(broker.records("orders").await.unwrap().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_cache_write_failure_is_swallowed() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    let total = Decimal::new(2100, 2);
    mocks.orders.expect_insert().return_ok(id);
    mocks.items.expect_insert_many().return_ok(vec![ItemId(1)]);
    mocks.orders.expect_update().return_ok(created_header(id, total));
    mocks.cache.expect_put().return_err(StoreError::Unavailable("cache down".into()));

    let broker = spawn_broker();
    let service = mocks.service(Arc::new(broker.clone()));
    let view = service
        .create_order(123, widget(), &CancellationToken::new())
        .await
        .expect("cache failure must not fail creation");

    assert_eq!(view.id, id);
    assert_eq!(view.total, total);
    assert_eq!(broker.records("orders").await.unwrap().len(), 1);
    mocks.verify();
}

#[tokio::test]
async fn test_publish_failure_is_fatal_after_writes() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    mocks.orders.expect_insert().return_ok(id);
    mocks.items.expect_insert_many().return_ok(vec![ItemId(1)]);
    mocks.orders.expect_update().return_ok(created_header(id, Decimal::new(2100, 2)));
    mocks.cache.expect_put().return_ok(());

    let service = mocks.service(Arc::new(RejectingTransport));
    let result = service.create_order(123, widget(), &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(OrderError::PublishFailure(PublishError::Rejected { .. }))
    ));
    // Everything before the publish stays written
    assert_eq!(mocks.orders.received(), vec!["insert", "update"]);
    assert_eq!(mocks.items.received(), vec!["insert_many"]);
    assert_eq!(mocks.cache.received(), vec!["put"]);
    mocks.verify();
}

#[tokio::test]
async fn test_cache_hit_touches_no_store() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    let view = OrderView::assemble(&created_header(id, Decimal::new(2100, 2)), &widget());
    mocks.cache.expect_get().return_ok(Some(cached(&view)));

    let service = mocks.service(Arc::new(spawn_broker()));
    let fetched = service.get_order(id, &CancellationToken::new()).await.unwrap();

    assert_eq!(fetched, view);
    assert!(mocks.orders.received().is_empty());
    assert!(mocks.items.received().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_missing_header_skips_item_query() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    mocks.cache.expect_get().return_ok(None);
    mocks.orders.expect_get().return_ok(None);

    let service = mocks.service(Arc::new(spawn_broker()));
    let result = service.get_order(id, &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::NotFound(missing)) if missing == id));
    assert!(mocks.items.received().is_empty());
    assert_eq!(mocks.cache.received(), vec!["get"]);
    mocks.verify();
}

#[tokio::test]
async fn test_cache_failures_fall_back_to_stores() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    let header = created_header(id, Decimal::new(2100, 2));
    mocks.cache.expect_get().return_err(StoreError::Unavailable("cache down".into()));
    mocks.orders.expect_get().return_ok(Some(header.clone()));
    mocks.items.expect_find().return_ok(vec![stored_item(id)]);
    mocks.cache.expect_put().return_err(StoreError::Unavailable("cache down".into()));

    let service = mocks.service(Arc::new(spawn_broker()));
    let view = service.get_order(id, &CancellationToken::new()).await.unwrap();

    assert_eq!(view, OrderView::assemble(&header, &[stored_item(id)]));
    mocks.verify();
}

#[tokio::test]
async fn test_unreadable_cache_entry_is_a_miss() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    let header = created_header(id, Decimal::new(2100, 2));
    mocks.cache.expect_get().return_ok(Some(CacheEntry {
        key: cache_key(id),
        payload: b"{not json".to_vec(),
        expires_at: Instant::now() + TTL,
    }));
    mocks.orders.expect_get().return_ok(Some(header));
    mocks.items.expect_find().return_ok(vec![stored_item(id)]);
    mocks.cache.expect_put().return_ok(());

    let service = mocks.service(Arc::new(spawn_broker()));
    let view = service.get_order(id, &CancellationToken::new()).await.unwrap();

    assert_eq!(view.items.len(), 1);
    assert_eq!(mocks.cache.received(), vec!["get", "put"]);
    mocks.verify();
}

#[tokio::test]
async fn test_item_read_failure_is_surfaced() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    mocks.cache.expect_get().return_ok(None);
    mocks.orders.expect_get().return_ok(Some(created_header(id, Decimal::ONE)));
    mocks.items.expect_find().return_err(StoreError::Unavailable("timeout".into()));

    let service = mocks.service(Arc::new(spawn_broker()));
    let result = service.get_order(id, &CancellationToken::new()).await;

    assert!(matches!(result, Err(OrderError::StorageUnavailable(_))));
    mocks.verify();
}

#[tokio::test]
async fn test_cancel_after_header_insert_keeps_the_header() {
    let mut mocks = Mocks::new();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    mocks
        .orders
        .expect_insert()
        .before_reply(move || trigger.cancel())
        .return_ok(OrderId::new_v4());

    let broker = spawn_broker();
    let service = mocks.service(Arc::new(broker.clone()));
    let result = service.create_order(123, widget(), &cancel).await;

    assert!(matches!(result, Err(OrderError::Cancelled("item insert"))));
    // The header write stands and no later step ran
    assert_eq!(mocks.orders.received(), vec!["insert"]);
    assert!(mocks.items.received().is_empty());
    assert!(mocks.cache.received().is_empty());
    assert!(broker.records("orders").await.unwrap().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_cancel_after_item_insert_keeps_both_writes() {
    let mut mocks = Mocks::new();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    mocks.orders.expect_insert().return_ok(OrderId::new_v4());
    mocks
        .items
        .expect_insert_many()
        .before_reply(move || trigger.cancel())
        .return_ok(vec![ItemId(1)]);

    let service = mocks.service(Arc::new(spawn_broker()));
    let result = service.create_order(123, widget(), &cancel).await;

    assert!(matches!(result, Err(OrderError::Cancelled("header update"))));
    assert_eq!(mocks.orders.received(), vec!["insert"]);
    assert_eq!(mocks.items.received(), vec!["insert_many"]);
    mocks.verify();
}

#[tokio::test]
async fn test_repeated_reads_hit_the_cache_only() {
    let mut mocks = Mocks::new();
    let id = OrderId::new_v4();
    let view = OrderView::assemble(&created_header(id, Decimal::new(2100, 2)), &widget());
    mocks.cache.expect_get().return_ok(Some(cached(&view)));
    mocks.cache.expect_get().return_ok(Some(cached(&view)));

    let service = mocks.service(Arc::new(spawn_broker()));
    let cancel = CancellationToken::new();
    let first = service.get_order(id, &cancel).await.unwrap();
    let second = service.get_order(id, &cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    assert_eq!(mocks.cache.received(), vec!["get", "get"]);
    assert!(mocks.orders.received().is_empty());
    assert!(mocks.items.received().is_empty());
    mocks.verify();
}

#[tokio::test]
async fn test_cancelled_token_stops_before_first_step() {
    let mocks = Mocks::new();
    let service = mocks.service(Arc::new(spawn_broker()));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let created = service.create_order(123, widget(), &cancel).await;
    assert!(matches!(created, Err(OrderError::Cancelled("header insert"))));

    let fetched = service.get_order(OrderId::new_v4(), &cancel).await;
    assert!(matches!(fetched, Err(OrderError::Cancelled("cache lookup"))));

    mocks.verify();
}
