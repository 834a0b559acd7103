//! Type-safe wrappers around [`StoreClient`](crate::framework::StoreClient), one per
//! external store the order core consumes.

pub mod cache_client;
pub mod item_client;
pub mod order_client;
pub mod record_store;

pub use cache_client::*;
pub use item_client::*;
pub use order_client::*;
pub use record_store::*;
