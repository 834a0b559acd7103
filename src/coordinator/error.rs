//! Error taxonomy of the order core.

use crate::framework::StoreError;
use crate::model::OrderId;
use crate::publisher::PublishError;
use thiserror::Error;

/// Errors surfaced by order creation and retrieval.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request is malformed; nothing was written.
    #[error("Order validation error: {0}")]
    Validation(String),

    /// No order with this id exists.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// A store could not be reached or did not answer.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(StoreError),

    /// A store refused the write (unique index, invalid record).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(StoreError),

    /// The creation event could not be delivered.
    #[error("Event publication failed: {0}")]
    PublishFailure(#[from] PublishError),

    /// The caller cancelled before this step started. Earlier writes are kept.
    #[error("Cancelled before {0}")]
    Cancelled(&'static str),
}

impl From<StoreError> for OrderError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(_) | StoreError::Rejected(_) => OrderError::ConstraintViolation(error),
            _ => OrderError::StorageUnavailable(error),
        }
    }
}

impl OrderError {
    /// Caller-fixable rejection.
    pub fn is_client_error(&self) -> bool {
        matches!(self, OrderError::Validation(_))
    }

    /// Maps to an empty result rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_taxonomy() {
        let unavailable: OrderError = StoreError::Closed.into();
        assert!(matches!(unavailable, OrderError::StorageUnavailable(_)));

        let violation: OrderError = StoreError::Duplicate("o/p".into()).into();
        assert!(matches!(violation, OrderError::ConstraintViolation(_)));

        assert!(OrderError::Validation("no items".into()).is_client_error());
        assert!(!violation.is_client_error());
        assert!(OrderError::NotFound(OrderId::new_v4()).is_not_found());
    }
}
