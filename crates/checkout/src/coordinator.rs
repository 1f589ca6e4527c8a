//! Order coordinator: pricing, pseudo-transactional persistence, and
//! status reads.

use catalog::CatalogGateway;
use chrono::{DateTime, Utc};
use common::{ItemId, Money, OrderId, SellerId};
use ledger::{OrderHeader, OrderLedger, OrderLine, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// Sentinel address stored when the caller supplies no email.
pub const GUEST_EMAIL: &str = "guest@bazaar.app";

/// Classification stamped on headers created through this coordinator.
const PAYMENT_TYPE: &str = "single_store";

/// Audit tag stamped into header metadata.
const METADATA_SOURCE: &str = "bazaar-agent";

/// One requested line of an order: which item, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// What the caller gets back from a successful order creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: OrderId,
    /// Total in major units, for presentation; the ledger stores minor
    /// units.
    pub total_amount: f64,
    pub currency: String,
    pub item_count: usize,
}

/// Read-only projection of an order's settlement state.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatusView {
    pub status: OrderStatus,
    pub total: Money,
    pub currency: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub customer_email: String,
}

/// Creation-time tracking token stamped into header metadata.
///
/// The `reference` column itself stays empty until a payment attempt;
/// it belongs to the processor. The random suffix comes from a v4 UUID,
/// so collisions are not a practical concern.
fn order_token(now: DateTime<Utc>) -> String {
    let (head, ..) = Uuid::new_v4().as_fields();
    format!("ORD-{}-{:08x}", now.timestamp_millis(), head)
}

struct PricedLine {
    item_id: ItemId,
    seller_id: SellerId,
    item_name: String,
    quantity: u32,
    unit_price: Money,
    line_total: Money,
}

/// Coordinates order creation and status queries over an injected
/// ledger and catalog.
///
/// The coordinator owns the header-and-lines atomicity contract: a
/// header must never be durably observable without at least one line.
/// Since the ledger exposes no cross-table transaction, a failed line
/// insert triggers a compensating header delete, and a failed
/// compensation surfaces both errors to the caller.
pub struct OrderCoordinator<L, C> {
    ledger: L,
    catalog: C,
    currency: String,
}

impl<L, C> OrderCoordinator<L, C>
where
    L: OrderLedger,
    C: CatalogGateway,
{
    /// Creates a new coordinator over the given ledger and catalog.
    pub fn new(ledger: L, catalog: C, currency: impl Into<String>) -> Self {
        Self {
            ledger,
            catalog,
            currency: currency.into(),
        }
    }

    /// Creates an order from the requested lines.
    ///
    /// Validates the request and resolves every price before the first
    /// write, so an unknown item or bad quantity leaves nothing behind.
    #[tracing::instrument(skip(self, items, customer_email), fields(item_count = items.len()))]
    pub async fn create_order(
        &self,
        items: Vec<LineRequest>,
        customer_email: Option<String>,
    ) -> Result<OrderReceipt> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }
        for request in &items {
            if request.quantity == 0 {
                return Err(CheckoutError::InvalidQuantity {
                    item_id: request.item_id.clone(),
                    quantity: request.quantity,
                });
            }
        }

        // Pricing pass: snapshot name, seller, and unit price per line.
        let mut total = Money::zero();
        let mut priced = Vec::with_capacity(items.len());
        for request in &items {
            let entry = self
                .catalog
                .get_item(&request.item_id)
                .await?
                .ok_or_else(|| CheckoutError::ItemNotFound(request.item_id.clone()))?;

            let unit_price =
                Money::from_major(entry.item.price).ok_or(CheckoutError::AmountOverflow)?;
            let line_total = unit_price
                .checked_mul(request.quantity)
                .ok_or(CheckoutError::AmountOverflow)?;
            total = total
                .checked_add(line_total)
                .ok_or(CheckoutError::AmountOverflow)?;

            priced.push(PricedLine {
                item_id: request.item_id.clone(),
                seller_id: entry.item.seller_id,
                item_name: entry.item.name,
                quantity: request.quantity,
                unit_price,
                line_total,
            });
        }

        let order_id = OrderId::new();
        let created_at = Utc::now();
        let header = OrderHeader {
            id: order_id,
            customer_email: customer_email.unwrap_or_else(|| GUEST_EMAIL.to_string()),
            total_minor: total,
            currency: self.currency.clone(),
            status: OrderStatus::Pending,
            paid_at: None,
            reference: None,
            payment_type: PAYMENT_TYPE.to_string(),
            metadata: serde_json::json!({
                "source": METADATA_SOURCE,
                "orderToken": order_token(created_at),
            }),
            created_at,
        };

        self.ledger.insert_header(&header).await?;

        let lines: Vec<OrderLine> = priced
            .into_iter()
            .map(|line| OrderLine {
                order_id,
                item_id: line.item_id,
                seller_id: line.seller_id,
                item_name: line.item_name,
                quantity: line.quantity,
                unit_price_minor: line.unit_price,
                line_total_minor: line.line_total,
            })
            .collect();

        if let Err(cause) = self.ledger.insert_lines(&lines).await {
            metrics::counter!("order_compensations_total").increment(1);
            if let Err(compensation) = self.ledger.delete_header(order_id).await {
                metrics::counter!("order_compensation_failures_total").increment(1);
                tracing::error!(
                    %order_id, %cause, %compensation,
                    "compensating delete failed; orphan header may remain"
                );
                return Err(CheckoutError::CompensationFailed {
                    order_id,
                    cause,
                    compensation,
                });
            }
            tracing::warn!(%order_id, %cause, "line insert failed; header rolled back");
            return Err(cause.into());
        }

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, total = %total, "order created");

        Ok(OrderReceipt {
            order_id,
            total_amount: total.as_major_f64(),
            currency: self.currency.clone(),
            item_count: items.len(),
        })
    }

    /// Returns the settlement state of an order.
    ///
    /// This is a pure local read: a `Pending` result is never
    /// re-verified against the payment processor.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_status(&self, order_id: OrderId) -> Result<OrderStatusView> {
        let header = self
            .ledger
            .get_header(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        Ok(OrderStatusView {
            status: header.status,
            total: header.total_minor,
            currency: header.currency,
            paid_at: header.paid_at,
            customer_email: header.customer_email,
        })
    }

    /// Records the payment processor's tracking token on an order.
    ///
    /// Last write wins; status and total are untouched.
    #[tracing::instrument(skip(self))]
    pub async fn attach_reference(&self, order_id: OrderId, reference: &str) -> Result<()> {
        let found = self.ledger.update_reference(order_id, reference).await?;
        if !found {
            return Err(CheckoutError::OrderNotFound(order_id));
        }
        Ok(())
    }
}
