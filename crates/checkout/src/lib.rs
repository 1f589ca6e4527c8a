//! Checkout core: order coordination and payment bridging.
//!
//! [`OrderCoordinator`] turns a set of requested line items into a
//! durable header-plus-lines record with consistent totals. The ledger
//! offers no cross-table transaction, so the coordinator persists the
//! header first, then the lines, and compensates with a header delete if
//! the lines fail; a failed compensation surfaces both errors.
//!
//! [`PaymentBridge`] mints payable links through an external processor,
//! and [`flow::issue_payment_link`] ties the two together so the amount
//! sent to the processor is always the order's stored total.

pub mod bridge;
pub mod coordinator;
pub mod error;
pub mod flow;

pub use bridge::{HttpPaymentBridge, InMemoryPaymentBridge, LinkRequest, PaymentBridge, PaymentLink};
pub use coordinator::{LineRequest, OrderCoordinator, OrderReceipt, OrderStatusView, GUEST_EMAIL};
pub use error::{CheckoutError, Result};
pub use flow::issue_payment_link;
