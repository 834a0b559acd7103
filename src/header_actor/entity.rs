//! StoreEntity implementation for the [`Order`] header.

use crate::framework::StoreEntity;
use crate::model::{Order, OrderCreate, OrderFilter, OrderId, OrderUpdate};

impl StoreEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Filter = OrderFilter;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, String> {
        Ok(Self::new(id, params.customer_id))
    }

    /// Sets the computed total and moves the header to its new status.
    ///
    /// A negative total cannot come from validated items, so it is refused.
    fn apply_update(&mut self, update: OrderUpdate) -> Result<(), String> {
        if update.total.is_sign_negative() {
            return Err(format!("total must not be negative, got {}", update.total));
        }
        self.total = update.total;
        self.status = update.status;
        Ok(())
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        match *filter {}
    }
}
