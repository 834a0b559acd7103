//! Cache-aside order retrieval.

use crate::clients::{CacheClient, ItemStoreClient, OrderStoreClient};
use crate::coordinator::cache::{read_view, write_view};
use crate::coordinator::{checkpoint, OrderError};
use crate::model::{OrderId, OrderView};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Serves views from the cache, rebuilding them from both stores on a miss.
///
/// A hit is trusted as-is for its whole TTL; nothing invalidates cached views.
#[derive(Clone)]
pub struct OrderRetrievalCoordinator {
    orders: OrderStoreClient,
    items: ItemStoreClient,
    cache: CacheClient,
    cache_ttl: Duration,
}

impl OrderRetrievalCoordinator {
    pub fn new(orders: OrderStoreClient, items: ItemStoreClient, cache: CacheClient, cache_ttl: Duration) -> Self {
        Self {
            orders,
            items,
            cache,
            cache_ttl,
        }
    }

    /// The materialized view of order `id`.
    ///
    /// # Errors
    /// - [`OrderError::NotFound`] if no header exists (the item store is not queried).
    /// - [`OrderError::StorageUnavailable`] if a store read fails on a miss.
    /// - [`OrderError::Cancelled`] if `cancel` fired before a step started.
    #[instrument(skip(self, cancel))]
    pub async fn get(&self, id: OrderId, cancel: &CancellationToken) -> Result<OrderView, OrderError> {
        checkpoint(cancel, "cache lookup")?;
        if let Some(view) = read_view(&self.cache, id).await {
            return Ok(view);
        }

        checkpoint(cancel, "header read")?;
        let Some(order) = self.orders.get_by_id(id).await? else {
            debug!("No such order");
            return Err(OrderError::NotFound(id));
        };

        checkpoint(cancel, "item read")?;
        let items = self
            .items
            .find_by_order_id(id)
            .await
            .inspect_err(|e| warn!(error = %e, "Item read failed"))?;

        let view = OrderView::assemble(&order, &items);
        checkpoint(cancel, "cache write")?;
        write_view(&self.cache, &view, self.cache_ttl).await;
        Ok(view)
    }
}
