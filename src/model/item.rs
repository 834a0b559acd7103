//! Order line items, stored in the document store apart from their header.

use crate::model::OrderId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identity of a stored line item document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

/// One requested line of a new order, before it belongs to any header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl NewOrderItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit_price`, exact.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    /// Stamps the line with the header it belongs to.
    pub fn for_order(self, order_id: OrderId) -> OrderItemCreate {
        OrderItemCreate {
            order_id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Sum of all line totals. Decimal arithmetic, so 2 × 10.50 is exactly 21.00.
pub fn order_total<'a>(items: impl IntoIterator<Item = &'a NewOrderItem>) -> Decimal {
    items.into_iter().map(NewOrderItem::line_total).sum()
}

/// A line item document as the document store keeps it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: ItemId,
    pub order_id: OrderId,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Payload for inserting a line item document.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemCreate {
    pub order_id: OrderId,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Items are never updated once written.
#[derive(Debug, Clone)]
pub enum ItemUpdate {}

/// Lookup predicate for line items.
#[derive(Debug, Clone)]
pub enum ItemFilter {
    Order(OrderId),
}

impl OrderItem {
    pub fn new(id: ItemId, params: OrderItemCreate) -> Self {
        Self {
            id,
            order_id: params.order_id,
            product_id: params.product_id,
            product_name: params.product_name,
            quantity: params.quantity,
            unit_price: params.unit_price,
        }
    }
}
