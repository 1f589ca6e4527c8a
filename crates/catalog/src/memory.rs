use std::sync::Arc;

use async_trait::async_trait;
use common::{ItemId, SellerId};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::gateway::{clamp_limit, CatalogGateway, ItemSearch, DEFAULT_SEARCH_LIMIT, DEFAULT_SELLER_LIMIT};
use crate::record::{CatalogItem, Item, Seller, SellerSummary};

#[derive(Debug, Default)]
struct CatalogState {
    sellers: Vec<Seller>,
    items: Vec<Item>,
}

/// In-memory catalog implementation for testing.
///
/// Seed it with sellers and items, then hand it to the checkout core the
/// same way the PostgreSQL implementation would be.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a seller to the catalog.
    pub async fn add_seller(&self, seller: Seller) {
        self.state.write().await.sellers.push(seller);
    }

    /// Adds an item to the catalog.
    pub async fn add_item(&self, item: Item) {
        self.state.write().await.items.push(item);
    }

    /// Returns the number of seeded items.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }
}

impl CatalogState {
    fn seller_summary(&self, seller_id: SellerId) -> Option<SellerSummary> {
        self.sellers
            .iter()
            .find(|s| s.id == seller_id)
            .map(SellerSummary::from)
    }
}

#[async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn get_item(&self, id: &ItemId) -> Result<Option<CatalogItem>> {
        let state = self.state.read().await;

        let found = state.items.iter().find(|item| &item.id == id);
        Ok(found.and_then(|item| {
            state.seller_summary(item.seller_id).map(|seller| CatalogItem {
                item: item.clone(),
                seller,
            })
        }))
    }

    async fn search_items(&self, search: &ItemSearch) -> Result<Vec<CatalogItem>> {
        let limit = clamp_limit(search.limit, DEFAULT_SEARCH_LIMIT) as usize;
        let needle = search.query.to_lowercase();

        let state = self.state.read().await;
        let results = state
            .items
            .iter()
            .filter(|item| item.is_available)
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .filter(|item| {
                search
                    .seller_id
                    .is_none_or(|seller_id| item.seller_id == seller_id)
            })
            .filter_map(|item| {
                state.seller_summary(item.seller_id).map(|seller| CatalogItem {
                    item: item.clone(),
                    seller,
                })
            })
            .take(limit)
            .collect();

        Ok(results)
    }

    async fn list_sellers(
        &self,
        limit: Option<u32>,
        _category: Option<&str>,
    ) -> Result<Vec<Seller>> {
        let limit = clamp_limit(limit, DEFAULT_SELLER_LIMIT) as usize;

        let state = self.state.read().await;
        Ok(state
            .sellers
            .iter()
            .filter(|s| s.status == "active")
            .take(limit)
            .cloned()
            .collect())
    }
}
