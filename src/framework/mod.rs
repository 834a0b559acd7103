//! Generic in-process store framework.
//!
//! Every external store the order core talks to (relational headers, document items,
//! cache, broker log) is modelled as a [`StoreActor`] owning its records in a Tokio task.
//!
//! # Main Components
//!
//! - [`StoreEntity`] - Trait that record types implement to be kept by a store
//! - [`StoreActor`] - Generic actor that owns records
//! - [`StoreClient`] - Typed, cloneable handle for sending requests
//! - [`StoreError`] - Common error type
//!
//! # Testing
//!
//! See [`mock`] module for answering client requests from scripted expectations.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use core::*;
