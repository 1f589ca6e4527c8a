//! Durable order ledger.
//!
//! The ledger stores order headers (one row per order) and order lines
//! (many rows per order) behind the [`OrderLedger`] trait. The trait
//! deliberately exposes only per-table insert/select/update/delete
//! operations and makes no cross-table atomicity promise; the checkout
//! coordinator layers its compensation contract on top of it.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use error::{LedgerError, Result};
pub use memory::InMemoryLedger;
pub use postgres::PostgresLedger;
pub use record::{OrderHeader, OrderLine, OrderStatus};
pub use store::OrderLedger;
