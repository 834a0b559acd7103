//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; store actors tag their lines with `entity_type`
//! and coordinators open spans named after the operation instead.
//!
//! ```bash
//! # Mutations, cache misses turned warnings, publish outcomes
//! RUST_LOG=info cargo run
//!
//! # Every store request and cache hit
//! RUST_LOG=debug cargo run
//!
//! # Only the publisher
//! RUST_LOG=order_coordinator::publisher=debug cargo run
//! ```
//!
//! A successful creation at `info` reads roughly:
//!
//! ```text
//! INFO Inserted entity_type="Order" id=3f0c… size=1
//! INFO create{customer_id=123 item_count=2}: Header inserted order_id=3f0c…
//! INFO Batch inserted entity_type="OrderItem" inserted=2 size=2
//! INFO Updated entity_type="Order" id=3f0c…
//! INFO create{customer_id=123 item_count=2}: Order created order_id=3f0c… total=96
//! INFO create{…}:publish{topic="orders" producer_id=…}: Message published key=9b1e… partition=0 offset=0 attempt=1
//! ```

/// Installs the global subscriber. Call once, from `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type and span names carry the context
        .compact()
        .init();
}
