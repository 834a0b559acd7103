//! The order write/read coordination logic.
//!
//! - [`OrderCreationCoordinator`] writes the header, the items, the total and status,
//!   warms the cache and publishes the creation event.
//! - [`OrderRetrievalCoordinator`] serves cache-aside reads.
//! - [`OrderService`] is the surface the transport layer calls.
//!
//! Every operation takes a [`CancellationToken`]. Cancellation only stops later steps
//! from starting; writes that already completed are never rolled back.

mod cache;
pub mod create;
pub mod error;
pub mod retrieve;

pub use create::*;
pub use error::*;
pub use retrieve::*;

use crate::model::{NewOrderItem, OrderId, OrderView};
use tokio_util::sync::CancellationToken;

/// Returns `Cancelled(step)` if the caller has given up.
pub(crate) fn checkpoint(cancel: &CancellationToken, step: &'static str) -> Result<(), OrderError> {
    if cancel.is_cancelled() {
        return Err(OrderError::Cancelled(step));
    }
    Ok(())
}

/// `createOrder` / `getOrder`, as exposed to the transport layer.
#[derive(Clone)]
pub struct OrderService {
    creation: OrderCreationCoordinator,
    retrieval: OrderRetrievalCoordinator,
}

impl OrderService {
    pub fn new(creation: OrderCreationCoordinator, retrieval: OrderRetrievalCoordinator) -> Self {
        Self { creation, retrieval }
    }

    pub async fn create_order(
        &self,
        customer_id: i32,
        items: Vec<NewOrderItem>,
        cancel: &CancellationToken,
    ) -> Result<OrderView, OrderError> {
        self.creation.create(customer_id, items, cancel).await
    }

    pub async fn get_order(&self, id: OrderId, cancel: &CancellationToken) -> Result<OrderView, OrderError> {
        self.retrieval.get(id, cancel).await
    }
}
