//! The notification emitted once an order has been fully created.

use crate::model::{OrderId, OrderItemView, OrderStatus, OrderView};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of an order at the moment creation succeeded.
///
/// Consumers that need exactly-once processing must deduplicate on `order_id`:
/// the broker key is random per publish call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: OrderId,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub items: Vec<OrderItemView>,
    pub published_at: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn from_view(view: &OrderView, published_at: DateTime<Utc>) -> Self {
        Self {
            order_id: view.id,
            customer_id: view.customer_id,
            created_at: view.created_at,
            total: view.total,
            status: view.status,
            items: view.items.clone(),
            published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewOrderItem, Order};

    #[test]
    fn test_event_payload_fields() {
        let mut order = Order::new(OrderId::new_v4(), 42);
        order.status = OrderStatus::Created;
        order.total = Decimal::new(9600, 2);
        let items = vec![NewOrderItem::new("A", "First", 3, Decimal::new(1500, 2))];
        let view = OrderView::assemble(&order, &items);

        let event = OrderCreatedEvent::from_view(&view, Utc::now());
        let json = serde_json::to_value(&event).unwrap();
        for field in ["orderId", "customerId", "createdAt", "total", "status", "items", "publishedAt"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["orderId"], view.id.to_string());
        assert_eq!(json["items"][0]["productName"], "First");
    }
}
