use crate::clients::record_store::RecordStore;
use crate::framework::{StoreClient, StoreError};
use crate::model::{ItemFilter, ItemId, OrderId, OrderItem, OrderItemCreate};
use tracing::{debug, instrument};

/// Client for the document item store.
#[derive(Clone)]
pub struct ItemStoreClient {
    inner: StoreClient<OrderItem>,
}

impl ItemStoreClient {
    pub fn new(inner: StoreClient<OrderItem>) -> Self {
        Self { inner }
    }

    /// Inserts all items as one batch. Either every item is stored or none is.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn insert_many(&self, items: Vec<OrderItemCreate>) -> Result<Vec<ItemId>, StoreError> {
        debug!("Sending request");
        self.inner.insert_many(items).await
    }

    /// Every item of `order_id`, in no particular order.
    #[instrument(skip(self))]
    pub async fn find_by_order_id(&self, order_id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        debug!("Sending request");
        self.inner.find(ItemFilter::Order(order_id)).await
    }
}

impl RecordStore<OrderItem> for ItemStoreClient {
    fn inner(&self) -> &StoreClient<OrderItem> {
        &self.inner
    }
}
