//! Transport-facing contracts: the create request and the materialized order view.
//!
//! [`OrderView`] is what creation returns, what the cache stores (as JSON under
//! `order:{id}`) and what retrieval rebuilds from both stores on a miss.

use crate::model::{NewOrderItem, Order, OrderId, OrderItem, OrderStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of a create-order call. A missing `items` list reads as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: i32,
    #[serde(default)]
    pub items: Vec<NewOrderItem>,
}

/// Denormalized projection of one header and all of its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<&NewOrderItem> for OrderItemView {
    fn from(item: &NewOrderItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl OrderView {
    /// Combines a header with its items.
    pub fn assemble<'a, I>(order: &Order, items: impl IntoIterator<Item = &'a I>) -> Self
    where
        I: 'a,
        OrderItemView: From<&'a I>,
    {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            created_at: order.created_at,
            status: order.status,
            total: order.total,
            items: items.into_iter().map(<OrderItemView as From<&'a I>>::from).collect(),
        }
    }

    /// Cache key for this view.
    pub fn cache_key(&self) -> String {
        cache_key(self.id)
    }

    /// Items sorted by product id, for comparisons that must ignore store ordering.
    pub fn sorted_items(&self) -> Vec<OrderItemView> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        items
    }
}

/// `order:{orderId}`.
pub fn cache_key(id: OrderId) -> String {
    format!("order:{id}")
}
