use crate::clients::record_store::RecordStore;
use crate::framework::{StoreClient, StoreError};
use crate::model::{Order, OrderCreate, OrderId, OrderUpdate};
use tracing::{debug, instrument};

/// Client for the relational order store.
#[derive(Clone)]
pub struct OrderStoreClient {
    inner: StoreClient<Order>,
}

impl OrderStoreClient {
    pub fn new(inner: StoreClient<Order>) -> Self {
        Self { inner }
    }

    /// Inserts a new header; the store assigns and returns its id.
    #[instrument(skip(self))]
    pub async fn insert(&self, customer_id: i32) -> Result<OrderId, StoreError> {
        debug!("Sending request");
        self.inner.insert(OrderCreate { customer_id }).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: OrderId, update: OrderUpdate) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.inner.update(id, update).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        debug!("Sending request");
        self.inner.get(id).await
    }
}

impl RecordStore<Order> for OrderStoreClient {
    fn inner(&self) -> &StoreClient<Order> {
        &self.inner
    }
}
