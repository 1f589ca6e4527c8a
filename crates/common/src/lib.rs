//! Shared types used across the bazaar checkout crates.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{ItemId, OrderId, SellerId};
