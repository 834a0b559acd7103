//! Producer configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// How many replicas must acknowledge a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acks {
    None,
    Leader,
    All,
}

impl FromStr for Acks {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "none" => Ok(Acks::None),
            "1" | "leader" => Ok(Acks::Leader),
            "all" | "-1" => Ok(Acks::All),
            other => Err(format!("unknown acks mode: {other}")),
        }
    }
}

impl Display for Acks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Acks::None => "0",
            Acks::Leader => "1",
            Acks::All => "all",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Snappy,
    Lz4,
    Zstd,
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gzip" => Ok(Compression::Gzip),
            "snappy" => Ok(Compression::Snappy),
            "lz4" => Ok(Compression::Lz4),
            "zstd" => Ok(Compression::Zstd),
            other => Err(format!("unknown compression: {other}")),
        }
    }
}

/// Producer settings for at-least-once delivery.
///
/// # Default Values
///
/// - `acks`: all replicas
/// - `enable_idempotence`: true
/// - `max_retries`: 3
/// - `message_timeout`: 5 seconds per attempt
/// - `retry_backoff`: 100ms
/// - `linger`: 10ms
/// - `batch_size`: 16384 bytes
/// - `compression`: snappy
///
/// `linger` and `batch_size` drive the [`BatchingTransport`](crate::publisher::BatchingTransport)
/// every publisher sends through. `acks` and `compression` describe the delivery contract
/// with an external broker; the in-process broker acknowledges after the append, which
/// meets every acks level, and stores payloads uncompressed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProducerSettings {
    pub acks: Acks,
    pub enable_idempotence: bool,
    pub max_retries: u32,
    pub message_timeout: Duration,
    pub retry_backoff: Duration,
    pub linger: Duration,
    pub batch_size: usize,
    pub compression: Compression,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            acks: Acks::All,
            enable_idempotence: true,
            max_retries: 3,
            message_timeout: Duration::from_millis(5000),
            retry_backoff: Duration::from_millis(100),
            linger: Duration::from_millis(10),
            batch_size: 16384,
            compression: Compression::Snappy,
        }
    }
}

impl ProducerSettings {
    /// Total send attempts for one publish call.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
