use catalog::CatalogError;
use common::{ItemId, OrderId};
use ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// An order was requested with no items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A requested quantity was not a positive integer.
    #[error("Invalid quantity {quantity} for item {item_id}")]
    InvalidQuantity { item_id: ItemId, quantity: u32 },

    /// A price or total fell outside the representable range.
    #[error("Order amount out of range")]
    AmountOverflow,

    /// A requested item id did not resolve in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// An order id did not resolve in the ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The payment processor answered with a non-success status.
    #[error("Payment backend error: {status} {body}")]
    PaymentBackend { status: u16, body: String },

    /// The payment processor could not be reached or answered garbage.
    #[error("Payment backend unreachable: {0}")]
    PaymentTransport(#[from] reqwest::Error),

    /// Order creation failed and the compensating header delete failed
    /// too; the named header may remain as a lineless orphan.
    #[error(
        "Order {order_id} creation failed ({cause}) and the compensating \
         delete failed ({compensation}); orphan header may remain"
    )]
    CompensationFailed {
        order_id: OrderId,
        cause: LedgerError,
        compensation: LedgerError,
    },

    /// Ledger error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Catalog error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
