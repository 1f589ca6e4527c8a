use async_trait::async_trait;
use common::OrderId;

use crate::error::Result;
use crate::record::{OrderHeader, OrderLine};

/// Durable store of order headers and order lines.
///
/// Every operation touches a single table and either fully applies or
/// fails; there is no cross-table transaction in this contract. The
/// checkout coordinator is responsible for the header-and-lines
/// atomicity invariant via its compensating delete.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Inserts a new order header row.
    ///
    /// Fails with [`LedgerError::DuplicateReference`] if the header
    /// carries a reference already stored on another order.
    ///
    /// [`LedgerError::DuplicateReference`]: crate::error::LedgerError
    async fn insert_header(&self, header: &OrderHeader) -> Result<()>;

    /// Inserts all lines for an order.
    async fn insert_lines(&self, lines: &[OrderLine]) -> Result<()>;

    /// Loads a header by order id.
    async fn get_header(&self, id: OrderId) -> Result<Option<OrderHeader>>;

    /// Loads the lines of an order in insertion order.
    async fn get_lines(&self, id: OrderId) -> Result<Vec<OrderLine>>;

    /// Overwrites the payment reference on a header; last write wins.
    ///
    /// Returns `false` when no header with the given id exists.
    async fn update_reference(&self, id: OrderId, reference: &str) -> Result<bool>;

    /// Deletes a header by id. Stores with cascading deletes also drop
    /// its lines; deleting a missing header is not an error.
    async fn delete_header(&self, id: OrderId) -> Result<()>;

    /// Ids of headers that have no lines.
    ///
    /// A lineless header can only exist after a failed creation whose
    /// compensating delete also failed; this scan is the operator hook
    /// for finding and garbage-collecting them.
    async fn orphaned_headers(&self) -> Result<Vec<OrderId>>;
}
