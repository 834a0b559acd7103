//! At-least-once publication of order events.
//!
//! [`EventPublisher`] serializes an event, gives it a fresh random key and hands it to an
//! [`EventTransport`] with a bounded number of retries, each attempt capped by the
//! producer's message timeout. Retries of one call share a producer sequence number so an
//! idempotent broker stores the message once even when an acknowledgement was lost.
//!
//! Sends go through a [`BatchingTransport`], so concurrent publishes within the linger
//! window reach the broker together.
//!
//! Failure after the last attempt is returned to the caller, never swallowed.

mod batch;
mod error;
mod settings;
mod transport;

pub use batch::*;
pub use error::*;
pub use settings::*;
pub use transport::*;

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Publishes events to topics through a shared transport.
pub struct EventPublisher {
    transport: Arc<dyn EventTransport>,
    settings: ProducerSettings,
    producer_id: Uuid,
    next_sequence: AtomicU64,
}

impl EventPublisher {
    /// Opens a producer session on `transport`, batching sends per `settings`.
    /// Must be called inside a Tokio runtime.
    pub fn new(transport: Arc<dyn EventTransport>, settings: ProducerSettings) -> Self {
        let producer_id = Uuid::new_v4();
        let transport: Arc<dyn EventTransport> = Arc::new(BatchingTransport::spawn(transport, settings.linger, settings.batch_size));
        info!(
            %producer_id,
            acks = %settings.acks,
            idempotent = settings.enable_idempotence,
            max_retries = settings.max_retries,
            timeout_ms = settings.message_timeout.as_millis() as u64,
            linger_ms = settings.linger.as_millis() as u64,
            batch_size = settings.batch_size,
            "Producer session opened"
        );
        Self {
            transport,
            settings,
            producer_id,
            next_sequence: AtomicU64::new(0),
        }
    }

    pub fn producer_id(&self) -> Uuid {
        self.producer_id
    }

    pub fn settings(&self) -> &ProducerSettings {
        &self.settings
    }

    /// Publishes `event` to `topic`. The event is owned by the publisher from here on.
    ///
    /// # Errors
    /// - [`PublishError::Serialization`] if the event cannot be encoded.
    /// - [`PublishError::Rejected`] if the broker refuses the message.
    /// - [`PublishError::RetriesExhausted`] once every attempt failed or timed out.
    #[instrument(skip(self, event), fields(producer_id = %self.producer_id))]
    pub async fn publish<E>(&self, topic: &str, event: E) -> Result<DeliveryReport, PublishError>
    where
        E: Serialize + Send,
    {
        let value = serde_json::to_vec(&event)?;
        drop(event);

        let sequence = self
            .settings
            .enable_idempotence
            .then(|| self.next_sequence.fetch_add(1, Ordering::SeqCst));
        let message = OutboundMessage {
            topic: topic.to_string(),
            key: Uuid::new_v4().to_string(),
            value,
            timestamp: Utc::now(),
            producer_id: self.producer_id,
            sequence,
        };
        info!(key = %message.key, "Publishing message");

        let attempts = self.settings.attempts();
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            let sent = tokio::time::timeout(self.settings.message_timeout, self.transport.send(&message)).await;
            match sent {
                Ok(Ok(report)) => {
                    info!(
                        key = %message.key,
                        partition = report.partition,
                        offset = report.offset,
                        attempt,
                        "Message published"
                    );
                    return Ok(report);
                }
                Ok(Err(e)) if !e.is_retriable() => {
                    error!(key = %message.key, error = %e, "Message rejected");
                    return Err(PublishError::Rejected {
                        topic: message.topic,
                        reason: e.to_string(),
                    });
                }
                Ok(Err(e)) => {
                    warn!(attempt, attempts, error = %e, "Publish attempt failed");
                    last_error = e.to_string();
                }
                Err(_) => {
                    warn!(attempt, attempts, "Publish attempt timed out");
                    last_error = format!("timed out after {:?}", self.settings.message_timeout);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.retry_backoff).await;
            }
        }

        error!(key = %message.key, attempts, %last_error, "Publish failed");
        Err(PublishError::RetriesExhausted {
            topic: message.topic,
            attempts,
            last_error,
        })
    }
}
