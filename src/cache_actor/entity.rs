//! Cache entries and their expiry rule.

use crate::framework::StoreEntity;
use std::time::Duration;
use tokio::time::Instant;

/// One cached value. Expires `ttl` after it was written, regardless of reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<u8>,
    pub expires_at: Instant,
}

/// Payload of a cache `set`.
#[derive(Debug, Clone)]
pub struct CacheWrite {
    pub payload: Vec<u8>,
    pub ttl: Duration,
}

/// Cache entries are replaced, never updated in place.
#[derive(Debug, Clone)]
pub enum CacheUpdate {}

/// Entries are only ever read by key.
#[derive(Debug, Clone)]
pub enum CacheFilter {}

impl StoreEntity for CacheEntry {
    type Id = String;
    type Create = CacheWrite;
    type Update = CacheUpdate;
    type Filter = CacheFilter;

    fn from_create_params(key: String, params: CacheWrite) -> Result<Self, String> {
        if params.ttl.is_zero() {
            return Err(format!("ttl for {key} must be positive"));
        }
        Ok(Self {
            key,
            payload: params.payload,
            expires_at: Instant::now() + params.ttl,
        })
    }

    fn apply_update(&mut self, update: CacheUpdate) -> Result<(), String> {
        match update {}
    }

    fn matches(&self, filter: &CacheFilter) -> bool {
        match *filter {}
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
