//! # Order Coordinator
//!
//! > **Order creation and retrieval across a relational store, a document store, a cache and a broker.**
//!
//! An order is split across two stores that share no transaction: the header (customer,
//! timestamp, status, total) lives in a relational store, its line items in a document
//! store. This crate coordinates writes to both, serves a cache-aside read path over a
//! materialized [`OrderView`](model::OrderView), and publishes an `OrderCreated` event with
//! at-least-once delivery.
//!
//! ## 🏗️ Design
//!
//! ### Stores as Actors
//! Every store is a [`StoreActor<T>`](framework::StoreActor) owning its records in a Tokio task
//! and answering typed requests over a channel. The loop is written once and reused for
//! headers, items, cached views and the topic log.
//!
//! ### No Distributed Transaction
//! Creation runs its steps strictly in order and never compensates. A failure leaves the
//! earlier writes in place and is returned to the caller; see
//! [`OrderCreationCoordinator`](coordinator::OrderCreationCoordinator).
//!
//! ### Advisory Cache
//! Cache failures never fail a request. Views expire after a fixed TTL and are never
//! invalidated, so a read may be stale until then.
//!
//! ### At-least-once Events
//! [`EventPublisher`](publisher::EventPublisher) retries a bounded number of times and keys every
//! message with a fresh UUID. Consumers must deduplicate on the order id in the payload.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Key items**: [`StoreEntity`](framework::StoreEntity), [`StoreActor`](framework::StoreActor),
//!   [`MockStore`](framework::mock::MockStore).
//!
//! ### 2. The Stores ([`header_actor`], [`item_actor`], [`cache_actor`], [`broker_actor`])
//! - **Role**: `StoreEntity` implementations and a `new(buffer)` factory per store.
//!
//! ### 3. The Interface ([`clients`])
//! - **Key items**: [`OrderStoreClient`](clients::OrderStoreClient),
//!   [`ItemStoreClient`](clients::ItemStoreClient), [`CacheClient`](clients::CacheClient).
//!
//! ### 4. The Core ([`coordinator`], [`publisher`], [`model`])
//! - **Key items**: [`OrderService`](coordinator::OrderService), [`OrderError`](coordinator::OrderError).
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! - **Key items**: [`OrderSystem`](lifecycle::OrderSystem), [`Settings`](config::Settings).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod broker_actor;
pub mod cache_actor;
pub mod clients;
pub mod config;
pub mod coordinator;
pub mod framework;
pub mod header_actor;
pub mod item_actor;
pub mod lifecycle;
pub mod model;
pub mod publisher;
