//! Reading and writing materialized views through the cache.
//!
//! The cache is advisory: every failure here is logged and absorbed, and the caller
//! carries on against the stores.

use crate::clients::CacheClient;
use crate::model::{cache_key, OrderId, OrderView};
use std::time::Duration;
use tracing::{debug, warn};

/// Cached view for `id`, or `None` on a miss, an unreadable payload or a cache failure.
pub(crate) async fn read_view(cache: &CacheClient, id: OrderId) -> Option<OrderView> {
    let key = cache_key(id);
    match cache.get(&key).await {
        Ok(Some(bytes)) => match serde_json::from_slice::<OrderView>(&bytes) {
            Ok(view) => {
                debug!(%key, "Cache hit");
                Some(view)
            }
            Err(e) => {
                warn!(%key, error = %e, "Unreadable cache entry, treating as miss");
                None
            }
        },
        Ok(None) => {
            debug!(%key, "Cache miss");
            None
        }
        Err(e) => {
            warn!(%key, error = %e, "Cache read failed, treating as miss");
            None
        }
    }
}

/// Stores `view` under its key for `ttl`. Never fails the caller.
pub(crate) async fn write_view(cache: &CacheClient, view: &OrderView, ttl: Duration) {
    let key = view.cache_key();
    let payload = match serde_json::to_vec(view) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(%key, error = %e, "Could not serialize view for cache");
            return;
        }
    };
    match cache.set(&key, payload, ttl).await {
        Ok(()) => debug!(%key, ttl_secs = ttl.as_secs(), "Cached view"),
        Err(e) => warn!(%key, error = %e, "Cache write failed, continuing"),
    }
}
