//! Read-only catalog gateway.
//!
//! The catalog is an external collaborator of the checkout core: it owns
//! sellers and items, and the coordinator only ever reads from it (price
//! and owning-seller lookups at order-creation time). All write paths
//! live elsewhere.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod record;

pub use error::{CatalogError, Result};
pub use gateway::{CatalogGateway, ItemSearch, DEFAULT_SEARCH_LIMIT, DEFAULT_SELLER_LIMIT, MAX_LIMIT};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use record::{CatalogItem, Item, Seller, SellerSummary};
