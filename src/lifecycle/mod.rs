//! Startup, wiring and shutdown of the order core.
//!
//! - [`OrderSystem`] spawns the four store actors and wires the coordinators to them
//! - [`setup_tracing`] initializes logging once per process

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use tracing::*;
