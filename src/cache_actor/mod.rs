//! Read-through cache: serialized order views under `order:{id}` with an absolute TTL.

pub mod entity;

pub use entity::*;

use crate::clients::CacheClient;
use crate::framework::StoreActor;

/// Creates a new cache actor and its client.
pub fn new(buffer_size: usize) -> (StoreActor<CacheEntry>, CacheClient) {
    let (actor, generic_client) = StoreActor::keyed(buffer_size);
    (actor, CacheClient::new(generic_client))
}
