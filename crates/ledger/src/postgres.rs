use async_trait::async_trait;
use common::{ItemId, Money, OrderId, SellerId};
use sqlx::{postgres::PgRow, PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::record::{OrderHeader, OrderLine};
use crate::store::OrderLedger;

/// Name of the unique index guarding payment references.
const REFERENCE_INDEX: &str = "order_headers_reference_key";

/// PostgreSQL-backed order ledger implementation.
#[derive(Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a new PostgreSQL order ledger.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_header(row: PgRow) -> Result<OrderHeader> {
        let status: String = row.try_get("status")?;

        Ok(OrderHeader {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_email: row.try_get("customer_email")?,
            total_minor: Money::from_minor(row.try_get("total_minor")?),
            currency: row.try_get("currency")?,
            status: status.parse()?,
            paid_at: row.try_get("paid_at")?,
            reference: row.try_get("reference")?,
            payment_type: row.try_get("payment_type")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_line(row: PgRow) -> Result<OrderLine> {
        let quantity: i64 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| LedgerError::Corrupt(format!("quantity out of range: {quantity}")))?;

        Ok(OrderLine {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            item_id: ItemId::new(row.try_get::<String, _>("item_id")?),
            seller_id: SellerId::from_uuid(row.try_get::<Uuid, _>("seller_id")?),
            item_name: row.try_get("item_name")?,
            quantity,
            unit_price_minor: Money::from_minor(row.try_get("unit_price_minor")?),
            line_total_minor: Money::from_minor(row.try_get("line_total_minor")?),
        })
    }

    fn map_reference_violation(e: sqlx::Error, reference: Option<&str>) -> LedgerError {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.constraint() == Some(REFERENCE_INDEX)
        {
            return LedgerError::DuplicateReference {
                reference: reference.unwrap_or_default().to_string(),
            };
        }
        LedgerError::Database(e)
    }
}

#[async_trait]
impl OrderLedger for PostgresLedger {
    async fn insert_header(&self, header: &OrderHeader) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_headers
                (id, customer_email, total_minor, currency, status, paid_at, reference,
                 payment_type, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(header.id.as_uuid())
        .bind(&header.customer_email)
        .bind(header.total_minor.minor())
        .bind(&header.currency)
        .bind(header.status.as_str())
        .bind(header.paid_at)
        .bind(&header.reference)
        .bind(&header.payment_type)
        .bind(&header.metadata)
        .bind(header.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::map_reference_violation(e, header.reference.as_deref()))?;

        Ok(())
    }

    async fn insert_lines(&self, lines: &[OrderLine]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }

        // Single multi-row insert: the line set applies or fails as one statement.
        let mut builder = QueryBuilder::new(
            "INSERT INTO order_lines \
             (order_id, item_id, seller_id, item_name, quantity, unit_price_minor, line_total_minor) ",
        );
        builder.push_values(lines, |mut b, line| {
            b.push_bind(line.order_id.as_uuid())
                .push_bind(line.item_id.as_str().to_string())
                .push_bind(line.seller_id.as_uuid())
                .push_bind(line.item_name.clone())
                .push_bind(i64::from(line.quantity))
                .push_bind(line.unit_price_minor.minor())
                .push_bind(line.line_total_minor.minor());
        });

        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn get_header(&self, id: OrderId) -> Result<Option<OrderHeader>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_email, total_minor, currency, status, paid_at, reference,
                   payment_type, metadata, created_at
            FROM order_headers
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_header).transpose()
    }

    async fn get_lines(&self, id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, item_id, seller_id, item_name, quantity,
                   unit_price_minor, line_total_minor
            FROM order_lines
            WHERE order_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }

    async fn update_reference(&self, id: OrderId, reference: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE order_headers SET reference = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(reference)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_reference_violation(e, Some(reference)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_header(&self, id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM order_headers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn orphaned_headers(&self) -> Result<Vec<OrderId>> {
        let rows = sqlx::query(
            r#"
            SELECT h.id
            FROM order_headers h
            LEFT JOIN order_lines l ON l.order_id = h.id
            WHERE l.order_id IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Ok(OrderId::from_uuid(row.try_get::<Uuid, _>("id")?)))
            .collect()
    }
}
