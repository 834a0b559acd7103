//! Order creation: header, items, total, status, cache, event, strictly in that order.

use crate::clients::{CacheClient, ItemStoreClient, OrderStoreClient};
use crate::coordinator::cache::write_view;
use crate::coordinator::{checkpoint, OrderError};
use crate::model::{order_total, NewOrderItem, OrderCreatedEvent, OrderStatus, OrderUpdate, OrderView};
use crate::publisher::EventPublisher;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Orchestrates the two-store write of a new order.
///
/// The stores share no transaction and nothing is compensated: if a step fails, the
/// writes before it stay in place and the error is returned. In particular an item
/// batch failure leaves the header `Pending` with a zero total, and a publish failure
/// fails the call even though header, items and cache are already written.
#[derive(Clone)]
pub struct OrderCreationCoordinator {
    orders: OrderStoreClient,
    items: ItemStoreClient,
    cache: CacheClient,
    publisher: Arc<EventPublisher>,
    topic: String,
    cache_ttl: Duration,
}

impl OrderCreationCoordinator {
    pub fn new(
        orders: OrderStoreClient,
        items: ItemStoreClient,
        cache: CacheClient,
        publisher: Arc<EventPublisher>,
        topic: impl Into<String>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            orders,
            items,
            cache,
            publisher,
            topic: topic.into(),
            cache_ttl,
        }
    }

    /// Creates an order for `customer_id` with `items` and returns its materialized view.
    ///
    /// # Errors
    /// - [`OrderError::Validation`] before any store is touched.
    /// - [`OrderError::StorageUnavailable`] / [`OrderError::ConstraintViolation`] from either store.
    /// - [`OrderError::PublishFailure`] if the creation event could not be delivered.
    /// - [`OrderError::Cancelled`] if `cancel` fired before a step started.
    #[instrument(skip(self, items, cancel), fields(item_count = items.len()))]
    pub async fn create(
        &self,
        customer_id: i32,
        items: Vec<NewOrderItem>,
        cancel: &CancellationToken,
    ) -> Result<OrderView, OrderError> {
        validate(&items).inspect_err(|e| warn!(error = %e, "Rejected order request"))?;

        // 1. Header, pending with zero total
        checkpoint(cancel, "header insert")?;
        let order_id = self
            .orders
            .insert(customer_id)
            .await
            .inspect_err(|e| error!(error = %e, "Header insert failed"))?;
        info!(%order_id, "Header inserted");

        // 2. Items as one batch
        checkpoint(cancel, "item insert")
            .inspect_err(|_| warn!(%order_id, "Cancelled with header pending"))?;
        let documents = items.iter().cloned().map(|item| item.for_order(order_id)).collect();
        self.items.insert_many(documents).await.inspect_err(|e| {
            error!(%order_id, error = %e, "Item insert failed, header left pending with zero total")
        })?;

        // 3. Total
        let total = order_total(&items);

        // 4. Total and final status
        checkpoint(cancel, "header update")
            .inspect_err(|_| warn!(%order_id, "Cancelled with header pending"))?;
        let update = OrderUpdate { total, status: OrderStatus::Created };
        let order = self.orders.update(order_id, update).await.inspect_err(|e| {
            error!(%order_id, error = %e, "Header update failed, items stored but total not set")
        })?;
        info!(%order_id, %total, "Order created");

        // 5. Warm the cache
        let view = OrderView::assemble(&order, &items);
        checkpoint(cancel, "cache write")?;
        write_view(&self.cache, &view, self.cache_ttl).await;

        // 6. Notify
        checkpoint(cancel, "event publish")
            .inspect_err(|_| warn!(%order_id, "Cancelled before the creation event was published"))?;
        let event = OrderCreatedEvent::from_view(&view, Utc::now());
        self.publisher
            .publish(&self.topic, event)
            .await
            .inspect_err(|e| error!(%order_id, error = %e, "Order created but event not published"))?;

        Ok(view)
    }
}

/// Rejects requests the stores would accept only partially or not at all.
fn validate(items: &[NewOrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::Validation("at least one item is required".into()));
    }

    let mut seen = HashSet::new();
    for item in items {
        if item.quantity < 1 {
            return Err(OrderError::Validation(format!(
                "quantity for {} must be at least 1",
                item.product_id
            )));
        }
        if item.unit_price.is_sign_negative() {
            return Err(OrderError::Validation(format!(
                "unit price for {} must not be negative",
                item.product_id
            )));
        }
        if !seen.insert(item.product_id.as_str()) {
            return Err(OrderError::Validation(format!(
                "product {} appears more than once",
                item.product_id
            )));
        }
    }
    Ok(())
}
