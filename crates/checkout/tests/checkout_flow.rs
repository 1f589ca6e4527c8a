//! Integration tests for the create-order and payment-link flow.

use catalog::{InMemoryCatalog, Item, Seller};
use checkout::{
    issue_payment_link, CheckoutError, InMemoryPaymentBridge, LineRequest, OrderCoordinator,
};
use common::{ItemId, Money, SellerId};
use ledger::{InMemoryLedger, OrderLedger, OrderStatus};
use rust_decimal::Decimal;
use std::str::FromStr;

type TestCoordinator = OrderCoordinator<InMemoryLedger, InMemoryCatalog>;

struct TestHarness {
    coordinator: TestCoordinator,
    ledger: InMemoryLedger,
    catalog: InMemoryCatalog,
    bridge: InMemoryPaymentBridge,
}

impl TestHarness {
    fn new() -> Self {
        let ledger = InMemoryLedger::new();
        let catalog = InMemoryCatalog::new();
        let bridge = InMemoryPaymentBridge::new();
        let coordinator = OrderCoordinator::new(ledger.clone(), catalog.clone(), "NGN");

        Self {
            coordinator,
            ledger,
            catalog,
            bridge,
        }
    }

    async fn seed_item(&self, id: &str, price: &str) {
        let seller = Seller {
            id: SellerId::new(),
            name: "Ada Fabrics".to_string(),
            slug: "ada-fabrics".to_string(),
            description: None,
            logo_url: None,
            currency: "NGN".to_string(),
            status: "active".to_string(),
        };
        let seller_id = seller.id;
        self.catalog.add_seller(seller).await;
        self.catalog
            .add_item(Item {
                id: ItemId::new(id),
                name: format!("Item {id}"),
                description: None,
                price: Decimal::from_str(price).unwrap(),
                image_url: None,
                seller_id,
                is_available: true,
            })
            .await;
    }

    fn request(&self, item_id: &str, quantity: u32) -> LineRequest {
        LineRequest {
            item_id: ItemId::new(item_id),
            quantity,
        }
    }
}

#[tokio::test]
async fn create_then_link_then_poll() {
    let harness = TestHarness::new();
    harness.seed_item("A", "500.00").await;

    let receipt = harness
        .coordinator
        .create_order(
            vec![harness.request("A", 2)],
            Some("buyer@example.com".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(receipt.total_amount, 1000.0);

    let link = issue_payment_link(&harness.coordinator, &harness.bridge, receipt.order_id)
        .await
        .unwrap();

    // The reference on the header is the processor's, verbatim.
    let header = harness
        .ledger
        .get_header(receipt.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.reference.as_deref(), Some(link.reference.as_str()));
    assert_eq!(header.status, OrderStatus::Pending);

    let view = harness
        .coordinator
        .get_order_status(receipt.order_id)
        .await
        .unwrap();
    assert_eq!(view.status, OrderStatus::Pending);
    assert!(view.paid_at.is_none());
}

#[tokio::test]
async fn link_amount_always_matches_stored_total() {
    let harness = TestHarness::new();
    harness.seed_item("A", "19.99").await;

    let receipt = harness
        .coordinator
        .create_order(vec![harness.request("A", 3)], None)
        .await
        .unwrap();

    issue_payment_link(&harness.coordinator, &harness.bridge, receipt.order_id)
        .await
        .unwrap();

    let header = harness
        .ledger
        .get_header(receipt.order_id)
        .await
        .unwrap()
        .unwrap();
    let sent = harness.bridge.last_request().unwrap();
    assert_eq!(sent.amount, header.total_minor);
    assert_eq!(sent.amount, Money::from_minor(5997));
    assert_eq!(sent.email, header.customer_email);
}

#[tokio::test]
async fn processor_failure_leaves_reference_unset() {
    let harness = TestHarness::new();
    harness.seed_item("A", "500.00").await;

    let receipt = harness
        .coordinator
        .create_order(vec![harness.request("A", 1)], None)
        .await
        .unwrap();

    harness.bridge.set_fail_on_generate(true);
    let result = issue_payment_link(&harness.coordinator, &harness.bridge, receipt.order_id).await;

    assert!(matches!(
        result,
        Err(CheckoutError::PaymentBackend { status: 502, .. })
    ));

    let header = harness
        .ledger
        .get_header(receipt.order_id)
        .await
        .unwrap()
        .unwrap();
    assert!(header.reference.is_none());
    assert_eq!(header.status, OrderStatus::Pending);
}

#[tokio::test]
async fn reissuing_a_link_overwrites_the_reference() {
    let harness = TestHarness::new();
    harness.seed_item("A", "500.00").await;

    let receipt = harness
        .coordinator
        .create_order(vec![harness.request("A", 1)], None)
        .await
        .unwrap();

    let first = issue_payment_link(&harness.coordinator, &harness.bridge, receipt.order_id)
        .await
        .unwrap();
    let second = issue_payment_link(&harness.coordinator, &harness.bridge, receipt.order_id)
        .await
        .unwrap();
    assert_ne!(first.reference, second.reference);

    let header = harness
        .ledger
        .get_header(receipt.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.reference.as_deref(), Some(second.reference.as_str()));
    assert_eq!(header.total_minor, Money::from_minor(50000));
    assert_eq!(header.status, OrderStatus::Pending);
}

#[tokio::test]
async fn linking_an_unknown_order_is_not_found() {
    let harness = TestHarness::new();

    let result = issue_payment_link(
        &harness.coordinator,
        &harness.bridge,
        common::OrderId::new(),
    )
    .await;

    assert!(matches!(result, Err(CheckoutError::OrderNotFound(_))));
    assert_eq!(harness.bridge.request_count(), 0);
}

#[tokio::test]
async fn settled_order_reports_paid_status() {
    let harness = TestHarness::new();
    harness.seed_item("A", "500.00").await;

    let receipt = harness
        .coordinator
        .create_order(vec![harness.request("A", 1)], None)
        .await
        .unwrap();

    let paid_at = chrono::Utc::now();
    harness
        .ledger
        .settle(receipt.order_id, OrderStatus::Paid, Some(paid_at))
        .await;

    let view = harness
        .coordinator
        .get_order_status(receipt.order_id)
        .await
        .unwrap();
    assert_eq!(view.status, OrderStatus::Paid);
    assert_eq!(view.paid_at, Some(paid_at));
}
