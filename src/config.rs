//! Runtime configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first if present. Missing variables
//! take their defaults; a variable that is set but unparseable is an error rather than
//! a silent fallback.

use crate::publisher::{Acks, Compression, ProducerSettings};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything [`OrderSystem`](crate::lifecycle::OrderSystem) needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Topic order-created events are published to.
    pub topic: String,
    /// Absolute lifetime of a cached view.
    pub cache_ttl: Duration,
    /// Channel capacity of each store actor.
    pub store_buffer: usize,
    pub producer: ProducerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            topic: "orders".to_string(),
            cache_ttl: Duration::from_secs(120),
            store_buffer: 32,
            producer: ProducerSettings::default(),
        }
    }
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first variable that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let producer = defaults.producer;

        Ok(Self {
            topic: lookup("ORDERS_TOPIC").unwrap_or(defaults.topic),
            cache_ttl: Duration::from_secs(positive_or(&lookup, "ORDERS_CACHE_TTL_SECS", defaults.cache_ttl.as_secs())?),
            store_buffer: positive_or(&lookup, "ORDERS_STORE_BUFFER", defaults.store_buffer)?,
            producer: ProducerSettings {
                acks: parse_or(&lookup, "PRODUCER_ACKS", producer.acks)?,
                enable_idempotence: parse_or(&lookup, "PRODUCER_IDEMPOTENCE", producer.enable_idempotence)?,
                max_retries: parse_or(&lookup, "PRODUCER_MAX_RETRIES", producer.max_retries)?,
                message_timeout: millis_or(&lookup, "PRODUCER_MESSAGE_TIMEOUT_MS", producer.message_timeout)?,
                retry_backoff: millis_or(&lookup, "PRODUCER_RETRY_BACKOFF_MS", producer.retry_backoff)?,
                linger: millis_or(&lookup, "PRODUCER_LINGER_MS", producer.linger)?,
                batch_size: parse_or(&lookup, "PRODUCER_BATCH_SIZE", producer.batch_size)?,
                compression: parse_or(&lookup, "PRODUCER_COMPRESSION", producer.compression)?,
            },
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Like [`parse_or`], but zero is refused: a zero-capacity channel cannot be built and a
/// zero TTL makes every cache write fail.
fn positive_or<T: FromStr + Default + PartialEq>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    let value = parse_or(lookup, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid { key, value: lookup(key).unwrap_or_default() });
    }
    Ok(value)
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let millis = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(lookup, key, millis).map(Duration::from_millis)
}
