//! Payment-link orchestration over the coordinator and the bridge.

use catalog::CatalogGateway;
use common::OrderId;
use ledger::OrderLedger;

use crate::bridge::{PaymentBridge, PaymentLink};
use crate::coordinator::OrderCoordinator;
use crate::error::Result;

/// Issues a payable link for an existing order and records the
/// processor's reference on it.
///
/// The amount sent to the processor is read off the stored header, never
/// recomputed. On a processor failure the order is left untouched:
/// status stays as it was and no reference is attached. Re-invoking for
/// the same order mints a fresh link and overwrites the reference.
#[tracing::instrument(skip(coordinator, bridge))]
pub async fn issue_payment_link<L, C, B>(
    coordinator: &OrderCoordinator<L, C>,
    bridge: &B,
    order_id: OrderId,
) -> Result<PaymentLink>
where
    L: OrderLedger,
    C: CatalogGateway,
    B: PaymentBridge,
{
    let order = coordinator.get_order_status(order_id).await?;

    let link = bridge
        .generate_payment_link(order_id, &order.customer_email, order.total)
        .await?;

    coordinator.attach_reference(order_id, &link.reference).await?;

    metrics::counter!("payment_links_issued_total").increment(1);
    tracing::info!(%order_id, reference = %link.reference, "payment link issued");

    Ok(link)
}
