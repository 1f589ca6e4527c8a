use chrono::{DateTime, Utc};
use common::{ItemId, Money, OrderId, SellerId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Settlement state of an order.
///
/// Starts at `Pending`; only the external settlement process moves it to
/// `Paid` or `Failed`. The checkout core reads it but never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl OrderStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(LedgerError::Corrupt(format!("unknown order status: {other}"))),
        }
    }
}

/// The top-level record for one checkout attempt.
///
/// `total_minor` is the sum of the line totals at creation time and is
/// never adjusted afterwards. `reference` holds the payment processor's
/// tracking token once a link has been issued; re-issuing a link for the
/// same order overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub id: OrderId,
    pub customer_email: String,
    pub total_minor: Money,
    pub currency: String,
    pub status: OrderStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub payment_type: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One priced, quantity-bearing item within an order.
///
/// Seller, name, and prices are snapshots taken from the catalog at
/// creation time; they are never re-synced if the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub seller_id: SellerId,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price_minor: Money,
    pub line_total_minor: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Failed] {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_rejects_unknown_strings() {
        let result = "refunded".parse::<OrderStatus>();
        assert!(matches!(result, Err(LedgerError::Corrupt(_))));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
