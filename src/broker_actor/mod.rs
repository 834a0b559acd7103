//! In-process message broker: an append-only topic log with idempotent-producer
//! duplicate suppression. Implements [`EventTransport`] so the publisher can run
//! without an external broker.

pub mod entity;

pub use entity::*;

use crate::framework::{StoreActor, StoreClient, StoreError};
use crate::publisher::{DeliveryReport, EventTransport, OutboundMessage, TransportError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Creates a new broker actor and the transport that writes to it.
pub fn new(buffer_size: usize) -> (StoreActor<TopicRecord>, InMemoryBroker) {
    let offset_counter = Arc::new(AtomicU64::new(0));
    let next_offset = move || offset_counter.fetch_add(1, Ordering::SeqCst);

    let (actor, generic_client) = StoreActor::new(buffer_size, next_offset);
    (actor, InMemoryBroker::new(generic_client))
}

/// Transport backed by the in-process topic log. Every record lands in partition 0.
#[derive(Clone)]
pub struct InMemoryBroker {
    inner: StoreClient<TopicRecord>,
}

impl InMemoryBroker {
    pub fn new(inner: StoreClient<TopicRecord>) -> Self {
        Self { inner }
    }

    /// All records of `topic`, in offset order.
    pub async fn records(&self, topic: &str) -> Result<Vec<TopicRecord>, StoreError> {
        let mut records = self.inner.find(TopicFilter::Topic(topic.to_string())).await?;
        records.sort_by_key(|record| record.offset);
        Ok(records)
    }

    async fn existing_offset(&self, message: &OutboundMessage, sequence: u64) -> Result<u64, StoreError> {
        let filter = TopicFilter::Producer { producer_id: message.producer_id, sequence };
        self.inner
            .find(filter)
            .await?
            .first()
            .map(|record| record.offset)
            .ok_or_else(|| StoreError::NotFound(format!("{}:{sequence}", message.producer_id)))
    }
}

fn transport_error(error: StoreError) -> TransportError {
    match error {
        StoreError::Rejected(reason) | StoreError::Duplicate(reason) => TransportError::Rejected(reason),
        other => TransportError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl EventTransport for InMemoryBroker {
    #[instrument(skip(self, message), fields(topic = %message.topic, key = %message.key))]
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport, TransportError> {
        let offset = match self.inner.insert(message.clone()).await {
            Ok(offset) => offset,
            Err(StoreError::Duplicate(_)) => {
                // Retry of an already-appended send: acknowledge the original offset.
                let sequence = message.sequence.ok_or_else(|| {
                    TransportError::Rejected("duplicate without producer sequence".into())
                })?;
                let offset = self.existing_offset(message, sequence).await.map_err(transport_error)?;
                debug!(offset, sequence, "Duplicate suppressed");
                offset
            }
            Err(e) => return Err(transport_error(e)),
        };

        Ok(DeliveryReport {
            topic: message.topic.clone(),
            partition: 0,
            offset,
        })
    }
}
