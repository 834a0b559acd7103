//! The authoritative order header kept in the relational store.
//!
//! [`Order`] implements the [`StoreEntity`](crate::framework::StoreEntity) trait (see
//! [`crate::header_actor`]), with [`OrderCreate`] as its insert payload and [`OrderUpdate`]
//! as the single mutation the creation flow performs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique order identity, assigned by the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// A fresh random (v4) identity.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Order lifecycle status. Only the creation states are in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Header written, line items and total not yet attached.
    Pending,
    /// Items persisted and total set.
    Created,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Created => "Created",
        };
        f.write_str(name)
    }
}

/// Represents an order header.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: i32,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
}

/// Payload for inserting a new header.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: i32,
}

/// The second header write of the creation flow: total and final status.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub total: Decimal,
    pub status: OrderStatus,
}

/// Headers are only ever read by id.
#[derive(Debug, Clone)]
pub enum OrderFilter {}

impl Order {
    /// Creates a header as the relational store first records it.
    ///
    /// # Notes
    /// The header starts `Pending` with a zero total; both are set once the items are known.
    pub fn new(id: OrderId, customer_id: i32) -> Self {
        Self {
            id,
            customer_id,
            created_at: Utc::now(),
            status: OrderStatus::Pending,
            total: Decimal::ZERO,
        }
    }
}
