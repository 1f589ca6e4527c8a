use common::{ItemId, SellerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A seller's storefront.
///
/// Only sellers with `status == "active"` are discoverable through the
/// gateway; the status field itself is owned by an out-of-scope admin
/// surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: SellerId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub currency: String,
    pub status: String,
}

/// The slice of a seller embedded into item payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerSummary {
    pub name: String,
    pub slug: String,
    pub currency: String,
}

impl From<&Seller> for SellerSummary {
    fn from(seller: &Seller) -> Self {
        Self {
            name: seller.name.clone(),
            slug: seller.slug.clone(),
            currency: seller.currency.clone(),
        }
    }
}

/// A catalog item. Prices are in major units; conversion to minor units
/// happens in the checkout core at order-creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub seller_id: SellerId,
    pub is_available: bool,
}

/// An item joined with a summary of its owning seller, as returned by
/// searches and detail lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(flatten)]
    pub item: Item,
    pub seller: SellerSummary,
}
