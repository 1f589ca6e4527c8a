//! PostgreSQL integration tests for the order ledger.
//!
//! These tests share one PostgreSQL container and need a local Docker
//! daemon, so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p ledger --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{ItemId, Money, OrderId, SellerId};
use ledger::{LedgerError, OrderHeader, OrderLedger, OrderLine, OrderStatus, PostgresLedger};
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresLedger::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh ledger with its own pool and cleared tables
async fn get_test_ledger() -> PostgresLedger {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_lines, order_headers")
        .execute(&pool)
        .await
        .unwrap();

    PostgresLedger::new(pool)
}

fn header(id: OrderId, reference: Option<&str>) -> OrderHeader {
    OrderHeader {
        id,
        customer_email: "buyer@example.com".to_string(),
        total_minor: Money::from_minor(100000),
        currency: "NGN".to_string(),
        status: OrderStatus::Pending,
        paid_at: None,
        reference: reference.map(String::from),
        payment_type: "single_store".to_string(),
        metadata: serde_json::json!({ "source": "bazaar-agent" }),
        created_at: Utc::now(),
    }
}

fn line(order_id: OrderId, item_id: &str) -> OrderLine {
    OrderLine {
        order_id,
        item_id: ItemId::new(item_id),
        seller_id: SellerId::new(),
        item_name: format!("Item {item_id}"),
        quantity: 2,
        unit_price_minor: Money::from_minor(50000),
        line_total_minor: Money::from_minor(100000),
    }
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn header_and_lines_round_trip() {
    let ledger = get_test_ledger().await;
    let id = OrderId::new();

    ledger.insert_header(&header(id, None)).await.unwrap();
    ledger
        .insert_lines(&[line(id, "sku-a"), line(id, "sku-b")])
        .await
        .unwrap();

    let loaded = ledger.get_header(id).await.unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.total_minor, Money::from_minor(100000));
    assert_eq!(loaded.status, OrderStatus::Pending);
    assert!(loaded.reference.is_none());
    assert_eq!(loaded.metadata["source"], "bazaar-agent");

    let lines = ledger.get_lines(id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].item_id, ItemId::new("sku-a"));
    assert_eq!(lines[1].item_id, ItemId::new("sku-b"));
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn missing_header_reads_as_none() {
    let ledger = get_test_ledger().await;
    let loaded = ledger.get_header(OrderId::new()).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn update_reference_overwrites_and_reports_missing() {
    let ledger = get_test_ledger().await;
    let id = OrderId::new();
    ledger.insert_header(&header(id, None)).await.unwrap();

    assert!(ledger.update_reference(id, "ref-1").await.unwrap());
    assert!(ledger.update_reference(id, "ref-2").await.unwrap());
    let loaded = ledger.get_header(id).await.unwrap().unwrap();
    assert_eq!(loaded.reference.as_deref(), Some("ref-2"));

    assert!(!ledger.update_reference(OrderId::new(), "ref-3").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn duplicate_reference_is_a_typed_error() {
    let ledger = get_test_ledger().await;
    let first = OrderId::new();
    let second = OrderId::new();
    ledger.insert_header(&header(first, Some("ref-dup"))).await.unwrap();

    let result = ledger.insert_header(&header(second, Some("ref-dup"))).await;
    assert!(matches!(
        result,
        Err(LedgerError::DuplicateReference { .. })
    ));

    ledger.insert_header(&header(second, None)).await.unwrap();
    let result = ledger.update_reference(second, "ref-dup").await;
    assert!(matches!(
        result,
        Err(LedgerError::DuplicateReference { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn delete_header_cascades_to_lines() {
    let ledger = get_test_ledger().await;
    let id = OrderId::new();
    ledger.insert_header(&header(id, None)).await.unwrap();
    ledger.insert_lines(&[line(id, "sku-a")]).await.unwrap();

    ledger.delete_header(id).await.unwrap();

    assert!(ledger.get_header(id).await.unwrap().is_none());
    assert!(ledger.get_lines(id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn orphan_scan_reports_lineless_headers() {
    let ledger = get_test_ledger().await;
    let orphan = OrderId::new();
    let complete = OrderId::new();
    ledger.insert_header(&header(orphan, None)).await.unwrap();
    ledger.insert_header(&header(complete, None)).await.unwrap();
    ledger.insert_lines(&[line(complete, "sku-a")]).await.unwrap();

    let orphans = ledger.orphaned_headers().await.unwrap();
    assert_eq!(orphans, vec![orphan]);
}
