use async_trait::async_trait;
use common::{ItemId, SellerId};
use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::gateway::{clamp_limit, CatalogGateway, ItemSearch, DEFAULT_SEARCH_LIMIT, DEFAULT_SELLER_LIMIT};
use crate::record::{CatalogItem, Item, Seller, SellerSummary};

/// PostgreSQL-backed catalog gateway.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

const ITEM_COLUMNS: &str = "i.id, i.name, i.description, i.price, i.image_url, i.seller_id, \
     i.is_available, s.name AS seller_name, s.slug AS seller_slug, s.currency AS seller_currency";

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog gateway.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_item(row: PgRow) -> Result<CatalogItem> {
        Ok(CatalogItem {
            item: Item {
                id: ItemId::new(row.try_get::<String, _>("id")?),
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                price: row.try_get::<Decimal, _>("price")?,
                image_url: row.try_get("image_url")?,
                seller_id: SellerId::from_uuid(row.try_get::<Uuid, _>("seller_id")?),
                is_available: row.try_get("is_available")?,
            },
            seller: SellerSummary {
                name: row.try_get("seller_name")?,
                slug: row.try_get("seller_slug")?,
                currency: row.try_get("seller_currency")?,
            },
        })
    }

    fn row_to_seller(row: PgRow) -> Result<Seller> {
        Ok(Seller {
            id: SellerId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            logo_url: row.try_get("logo_url")?,
            currency: row.try_get("currency")?,
            status: row.try_get("status")?,
        })
    }
}

#[async_trait]
impl CatalogGateway for PostgresCatalog {
    async fn get_item(&self, id: &ItemId) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items i JOIN sellers s ON s.id = i.seller_id WHERE i.id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn search_items(&self, search: &ItemSearch) -> Result<Vec<CatalogItem>> {
        let limit = clamp_limit(search.limit, DEFAULT_SEARCH_LIMIT);

        let mut sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items i JOIN sellers s ON s.id = i.seller_id \
             WHERE i.is_available AND i.name ILIKE $1"
        );
        let mut param_count = 1;

        if search.seller_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND i.seller_id = ${param_count}"));
        }

        param_count += 1;
        sql.push_str(&format!(" ORDER BY i.name ASC LIMIT ${param_count}"));

        let mut query = sqlx::query(&sql).bind(format!("%{}%", search.query));
        if let Some(seller_id) = search.seller_id {
            query = query.bind(seller_id.as_uuid());
        }
        query = query.bind(i64::from(limit));

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn list_sellers(
        &self,
        limit: Option<u32>,
        _category: Option<&str>,
    ) -> Result<Vec<Seller>> {
        let limit = clamp_limit(limit, DEFAULT_SELLER_LIMIT);

        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, logo_url, currency, status
            FROM sellers
            WHERE status = 'active'
            ORDER BY name ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_seller).collect()
    }
}
