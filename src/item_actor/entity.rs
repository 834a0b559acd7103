//! StoreEntity implementation for [`OrderItem`] documents.

use crate::framework::StoreEntity;
use crate::model::{ItemFilter, ItemId, ItemUpdate, OrderItem, OrderItemCreate};

impl StoreEntity for OrderItem {
    type Id = ItemId;
    type Create = OrderItemCreate;
    type Update = ItemUpdate;
    type Filter = ItemFilter;

    fn from_create_params(id: ItemId, params: OrderItemCreate) -> Result<Self, String> {
        if params.quantity < 1 {
            return Err(format!("quantity must be at least 1 for {}", params.product_id));
        }
        if params.unit_price.is_sign_negative() {
            return Err(format!("unit price must not be negative for {}", params.product_id));
        }
        Ok(Self::new(id, params))
    }

    fn apply_update(&mut self, update: ItemUpdate) -> Result<(), String> {
        match update {}
    }

    fn matches(&self, filter: &ItemFilter) -> bool {
        match filter {
            ItemFilter::Order(order_id) => self.order_id == *order_id,
        }
    }

    /// Uniqueness index on `(orderId, productId)`.
    fn unique_key(&self) -> Option<String> {
        Some(format!("{}/{}", self.order_id, self.product_id))
    }
}
