use async_trait::async_trait;
use common::{ItemId, SellerId};

use crate::error::Result;
use crate::record::{CatalogItem, Seller};

/// Hard cap on caller-supplied listing limits, to prevent scraping.
pub const MAX_LIMIT: u32 = 100;

/// Default page size for seller listings.
pub const DEFAULT_SELLER_LIMIT: u32 = 10;

/// Default page size for item searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Parameters for an item search.
#[derive(Debug, Clone, Default)]
pub struct ItemSearch {
    /// Case-insensitive substring matched against item names.
    pub query: String,
    pub limit: Option<u32>,
    pub seller_id: Option<SellerId>,
    /// Accepted for forward compatibility; not wired to a column yet.
    pub category: Option<String>,
}

impl ItemSearch {
    /// Creates a search over all sellers with default paging.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Clamps a caller-supplied limit to the allowed range.
pub(crate) fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).min(MAX_LIMIT)
}

/// Read-only access to sellers and items.
///
/// Implementations are injected into the checkout core at construction
/// time so tests can substitute a seeded in-memory catalog.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Looks up a single item by id together with its owning seller.
    ///
    /// Returns `None` when the id does not resolve. Availability is not
    /// checked here; an unavailable item can still be inspected.
    async fn get_item(&self, id: &ItemId) -> Result<Option<CatalogItem>>;

    /// Searches available items by name substring, optionally scoped to
    /// one seller. Results are capped at [`MAX_LIMIT`].
    async fn search_items(&self, search: &ItemSearch) -> Result<Vec<CatalogItem>>;

    /// Lists active sellers. `category` is accepted but not used by the
    /// current filter. Results are capped at [`MAX_LIMIT`].
    async fn list_sellers(&self, limit: Option<u32>, category: Option<&str>)
    -> Result<Vec<Seller>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_applies_default() {
        assert_eq!(clamp_limit(None, DEFAULT_SELLER_LIMIT), 10);
        assert_eq!(clamp_limit(None, DEFAULT_SEARCH_LIMIT), 20);
    }

    #[test]
    fn clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(Some(500), DEFAULT_SEARCH_LIMIT), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(99), DEFAULT_SEARCH_LIMIT), 99);
    }
}
