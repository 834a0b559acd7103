use crate::cache_actor::{CacheEntry, CacheWrite};
use crate::framework::{StoreClient, StoreError};
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for the read-through cache.
#[derive(Clone)]
pub struct CacheClient {
    inner: StoreClient<CacheEntry>,
}

impl CacheClient {
    pub fn new(inner: StoreClient<CacheEntry>) -> Self {
        Self { inner }
    }

    /// The live value under `key`, if any.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        debug!("Sending request");
        let entry = self.inner.get(key.to_string()).await?;
        Ok(entry.map(|entry| entry.payload))
    }

    /// Stores `payload` under `key`, replacing any previous value, for `ttl` from now.
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    pub async fn set(&self, key: &str, payload: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        debug!("Sending request");
        self.inner.put(key.to_string(), CacheWrite { payload, ttl }).await
    }
}
