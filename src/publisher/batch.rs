//! Producer-side batching.
//!
//! [`BatchingTransport`] queues outgoing messages in a background task and hands them to
//! the underlying transport in one `send_batch` call once the linger window has passed
//! since the first queued message, or as soon as the queued bytes reach the batch size.
//! Each caller still gets its own delivery report.

use crate::publisher::{DeliveryReport, EventTransport, OutboundMessage, TransportError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;

type Reply = oneshot::Sender<Result<DeliveryReport, TransportError>>;

struct Queued {
    message: OutboundMessage,
    respond_to: Reply,
}

/// An [`EventTransport`] that coalesces sends into batches.
///
/// The batching task stops once every handle is dropped, after flushing what it holds.
pub struct BatchingTransport {
    sender: mpsc::Sender<Queued>,
}

impl BatchingTransport {
    /// Starts the batching task in front of `inner`. Must be called inside a Tokio runtime.
    pub fn spawn(inner: Arc<dyn EventTransport>, linger: Duration, batch_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel(1024);
        tokio::spawn(run(inner, receiver, linger, batch_size));
        Self { sender }
    }
}

#[async_trait]
impl EventTransport for BatchingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryReport, TransportError> {
        let (respond_to, response) = oneshot::channel();
        let queued = Queued { message: message.clone(), respond_to };
        self.sender
            .send(queued)
            .await
            .map_err(|_| TransportError::Unavailable("producer closed".into()))?;
        response
            .await
            .map_err(|_| TransportError::Unavailable("batch dropped before delivery".into()))?
    }
}

async fn run(
    inner: Arc<dyn EventTransport>,
    mut receiver: mpsc::Receiver<Queued>,
    linger: Duration,
    batch_size: usize,
) {
    while let Some(first) = receiver.recv().await {
        let deadline = Instant::now() + linger;
        let mut bytes = first.message.size();
        let mut batch = vec![first];

        while bytes < batch_size {
            match tokio::time::timeout_at(deadline, receiver.recv()).await {
                Ok(Some(next)) => {
                    bytes += next.message.size();
                    batch.push(next);
                }
                // linger elapsed, or every sender is gone
                Ok(None) | Err(_) => break,
            }
        }

        flush(inner.as_ref(), batch, bytes).await;
    }
}

async fn flush(inner: &dyn EventTransport, batch: Vec<Queued>, bytes: usize) {
    let (messages, replies): (Vec<_>, Vec<_>) =
        batch.into_iter().map(|queued| (queued.message, queued.respond_to)).unzip();
    debug!(count = messages.len(), bytes, "Flushing batch");

    let results = inner.send_batch(&messages).await;
    // A reply without a result is dropped, which the caller sees as Unavailable.
    for (reply, result) in replies.into_iter().zip(results) {
        let _ = reply.send(result);
    }
}
