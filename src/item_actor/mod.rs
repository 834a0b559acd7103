//! Document item store: line items keyed by order, unique per `(orderId, productId)`.

pub mod entity;

use crate::clients::ItemStoreClient;
use crate::framework::StoreActor;
use crate::model::{ItemId, OrderItem};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Creates a new item store actor and its client.
pub fn new(buffer_size: usize) -> (StoreActor<OrderItem>, ItemStoreClient) {
    let item_id_counter = Arc::new(AtomicU64::new(1));
    let next_item_id = move || ItemId(item_id_counter.fetch_add(1, Ordering::SeqCst));

    let (actor, generic_client) = StoreActor::new(buffer_size, next_item_id);
    (actor, ItemStoreClient::new(generic_client))
}
