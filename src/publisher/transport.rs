//! The seam between the publisher and whatever broker client delivers messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// A message ready to hand to the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: String,
    pub key: String,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    /// Producer session that sent the message.
    pub producer_id: Uuid,
    /// Per-session sequence, present when the producer is idempotent.
    /// Every retry of one publish call carries the same value.
    pub sequence: Option<u64>,
}

impl OutboundMessage {
    /// Bytes counted against the producer's batch size.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// Where a message landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: u64,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Broker unreachable or not acknowledging; worth retrying.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    /// Broker refused the message; retrying cannot help.
    #[error("message rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_))
    }
}

/// `send(topic, key, value) → partition/offset or error`.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport, TransportError>;

    /// Delivers a batch, one result per message in the same order.
    ///
    /// The default sends the messages one after another.
    async fn send_batch(&self, messages: &[OutboundMessage]) -> Vec<Result<DeliveryReport, TransportError>> {
        let mut results = Vec::with_capacity(messages.len());
        for message in messages {
            results.push(self.send(message).await);
        }
        results
    }
}
