//! Relational order store: authoritative headers, identity assignment, status and total.

pub mod entity;

use crate::clients::OrderStoreClient;
use crate::framework::StoreActor;
use crate::model::{Order, OrderId};

/// Creates a new header store actor and its client.
pub fn new(buffer_size: usize) -> (StoreActor<Order>, OrderStoreClient) {
    let (actor, generic_client) = StoreActor::new(buffer_size, OrderId::new_v4);
    (actor, OrderStoreClient::new(generic_client))
}
