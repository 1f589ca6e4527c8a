use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use tokio::sync::RwLock;

use crate::error::{LedgerError, Result};
use crate::record::{OrderHeader, OrderLine, OrderStatus};
use crate::store::OrderLedger;

#[derive(Debug, Default)]
struct LedgerState {
    headers: HashMap<OrderId, OrderHeader>,
    lines: HashMap<OrderId, Vec<OrderLine>>,
    fail_on_insert_lines: bool,
    fail_on_delete_header: bool,
}

impl LedgerState {
    fn reference_taken(&self, reference: &str, except: OrderId) -> bool {
        self.headers.values().any(|header| {
            header.id != except && header.reference.as_deref() == Some(reference)
        })
    }
}

/// In-memory order ledger implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure-injection switches for exercising the coordinator's
/// compensation path and a settlement helper standing in for the
/// external confirmation process.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    /// Creates a new empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the ledger to fail line inserts.
    pub async fn set_fail_on_insert_lines(&self, fail: bool) {
        self.state.write().await.fail_on_insert_lines = fail;
    }

    /// Configures the ledger to fail header deletes.
    pub async fn set_fail_on_delete_header(&self, fail: bool) {
        self.state.write().await.fail_on_delete_header = fail;
    }

    /// Returns the number of stored headers.
    pub async fn header_count(&self) -> usize {
        self.state.read().await.headers.len()
    }

    /// Returns the total number of stored lines across all orders.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.values().map(Vec::len).sum()
    }

    /// Marks an order settled, standing in for the external settlement
    /// process that owns `status` and `paid_at` in production.
    pub async fn settle(&self, id: OrderId, status: OrderStatus, paid_at: Option<DateTime<Utc>>) {
        let mut state = self.state.write().await;
        if let Some(header) = state.headers.get_mut(&id) {
            header.status = status;
            header.paid_at = paid_at;
        }
    }
}

#[async_trait]
impl OrderLedger for InMemoryLedger {
    async fn insert_header(&self, header: &OrderHeader) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(reference) = header.reference.as_deref()
            && state.reference_taken(reference, header.id)
        {
            return Err(LedgerError::DuplicateReference {
                reference: reference.to_string(),
            });
        }

        state.headers.insert(header.id, header.clone());
        Ok(())
    }

    async fn insert_lines(&self, lines: &[OrderLine]) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_insert_lines {
            return Err(LedgerError::Unavailable("line insert rejected".to_string()));
        }

        for line in lines {
            state.lines.entry(line.order_id).or_default().push(line.clone());
        }
        Ok(())
    }

    async fn get_header(&self, id: OrderId) -> Result<Option<OrderHeader>> {
        Ok(self.state.read().await.headers.get(&id).cloned())
    }

    async fn get_lines(&self, id: OrderId) -> Result<Vec<OrderLine>> {
        Ok(self.state.read().await.lines.get(&id).cloned().unwrap_or_default())
    }

    async fn update_reference(&self, id: OrderId, reference: &str) -> Result<bool> {
        let mut state = self.state.write().await;

        if !state.headers.contains_key(&id) {
            return Ok(false);
        }
        if state.reference_taken(reference, id) {
            return Err(LedgerError::DuplicateReference {
                reference: reference.to_string(),
            });
        }

        if let Some(header) = state.headers.get_mut(&id) {
            header.reference = Some(reference.to_string());
        }
        Ok(true)
    }

    async fn delete_header(&self, id: OrderId) -> Result<()> {
        let mut state = self.state.write().await;

        if state.fail_on_delete_header {
            return Err(LedgerError::Unavailable("header delete rejected".to_string()));
        }

        state.headers.remove(&id);
        state.lines.remove(&id);
        Ok(())
    }

    async fn orphaned_headers(&self) -> Result<Vec<OrderId>> {
        let state = self.state.read().await;
        Ok(state
            .headers
            .keys()
            .filter(|id| state.lines.get(id).is_none_or(Vec::is_empty))
            .copied()
            .collect())
    }
}
