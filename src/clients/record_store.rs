use crate::framework::{StoreClient, StoreEntity, StoreError};
use async_trait::async_trait;

/// Maintenance operations shared by the durable stores.
///
/// Implementors only expose their inner [`StoreClient`]; `count` and `remove_all` come
/// for free.
#[async_trait]
pub trait RecordStore<T: StoreEntity>: Send + Sync {
    /// Access the inner generic StoreClient.
    fn inner(&self) -> &StoreClient<T>;

    /// Number of stored records.
    #[tracing::instrument(skip(self))]
    async fn count(&self) -> Result<usize, StoreError> {
        tracing::debug!("Sending request");
        self.inner().count().await
    }

    /// Removes every record, returning how many were removed.
    #[tracing::instrument(skip(self))]
    async fn remove_all(&self) -> Result<usize, StoreError> {
        tracing::debug!("Sending request");
        self.inner().clear().await
    }
}
