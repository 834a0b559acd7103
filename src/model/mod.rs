//! Pure data structures: the order header, its line items, the materialized view and the
//! creation event.

pub mod event;
pub mod item;
pub mod order;
pub mod view;

pub use event::*;
pub use item::*;
pub use order::*;
pub use view::*;
