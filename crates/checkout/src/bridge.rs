//! Payment bridge: mints payable links through an external processor.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// A payable link minted by the payment processor, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Bridge to the external payment processor.
///
/// The bridge never recomputes or re-prices: the amount it is handed is
/// authoritative and must match the order's stored total, which the
/// payment-link flow guarantees by reading it off the header. It also
/// never touches the ledger; recording the returned reference is the
/// caller's job.
#[async_trait]
pub trait PaymentBridge: Send + Sync {
    /// Asks the processor for a payable link covering `amount`.
    async fn generate_payment_link(
        &self,
        order_id: OrderId,
        email: &str,
        amount: Money,
    ) -> Result<PaymentLink>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    order_id: OrderId,
    email: &'a str,
    amount_minor: i64,
    metadata: serde_json::Value,
}

/// Payment bridge over a synchronous HTTP call to the processor API.
#[derive(Clone)]
pub struct HttpPaymentBridge {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPaymentBridge {
    /// Creates a bridge posting to the given checkout endpoint.
    ///
    /// No request timeout is set here; deployments impose one at the
    /// transport layer.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PaymentBridge for HttpPaymentBridge {
    #[tracing::instrument(skip(self, email))]
    async fn generate_payment_link(
        &self,
        order_id: OrderId,
        email: &str,
        amount: Money,
    ) -> Result<PaymentLink> {
        let body = CheckoutRequest {
            order_id,
            email,
            amount_minor: amount.minor(),
            metadata: serde_json::json!({ "source": "bazaar-agent" }),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("payment_link_failures_total").increment(1);
            tracing::warn!(%order_id, status = status.as_u16(), "payment backend refused link");
            return Err(CheckoutError::PaymentBackend {
                status: status.as_u16(),
                body,
            });
        }

        let link = response.json::<PaymentLink>().await?;
        Ok(link)
    }
}

/// One recorded link request, for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRequest {
    pub order_id: OrderId,
    pub email: String,
    pub amount: Money,
}

#[derive(Debug, Default)]
struct InMemoryBridgeState {
    requests: Vec<LinkRequest>,
    next_id: u32,
    fail_on_generate: bool,
}

/// In-memory payment bridge for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentBridge {
    state: Arc<RwLock<InMemoryBridgeState>>,
}

impl InMemoryPaymentBridge {
    /// Creates a new in-memory payment bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bridge to refuse the next link request.
    pub fn set_fail_on_generate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_generate = fail;
    }

    /// Returns the number of link requests received.
    pub fn request_count(&self) -> usize {
        self.state.read().unwrap().requests.len()
    }

    /// Returns the most recent link request, if any.
    pub fn last_request(&self) -> Option<LinkRequest> {
        self.state.read().unwrap().requests.last().cloned()
    }
}

#[async_trait]
impl PaymentBridge for InMemoryPaymentBridge {
    async fn generate_payment_link(
        &self,
        order_id: OrderId,
        email: &str,
        amount: Money,
    ) -> Result<PaymentLink> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_generate {
            return Err(CheckoutError::PaymentBackend {
                status: 502,
                body: "payment backend unavailable".to_string(),
            });
        }

        state.requests.push(LinkRequest {
            order_id,
            email: email.to_string(),
            amount,
        });

        state.next_id += 1;
        let access_code = format!("AC-{:04}", state.next_id);
        Ok(PaymentLink {
            authorization_url: format!("https://pay.bazaar.app/authorize/{access_code}"),
            reference: format!("PAY-{:04}", state.next_id),
            access_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_bridge_mints_sequential_links() {
        let bridge = InMemoryPaymentBridge::new();
        let order_id = OrderId::new();

        let first = bridge
            .generate_payment_link(order_id, "buyer@example.com", Money::from_minor(1000))
            .await
            .unwrap();
        let second = bridge
            .generate_payment_link(order_id, "buyer@example.com", Money::from_minor(1000))
            .await
            .unwrap();

        assert_eq!(first.reference, "PAY-0001");
        assert_eq!(second.reference, "PAY-0002");
        assert!(first.authorization_url.ends_with(&first.access_code));
        assert_eq!(bridge.request_count(), 2);
    }

    #[tokio::test]
    async fn in_memory_bridge_records_the_request() {
        let bridge = InMemoryPaymentBridge::new();
        let order_id = OrderId::new();

        bridge
            .generate_payment_link(order_id, "buyer@example.com", Money::from_minor(4200))
            .await
            .unwrap();

        let request = bridge.last_request().unwrap();
        assert_eq!(request.order_id, order_id);
        assert_eq!(request.email, "buyer@example.com");
        assert_eq!(request.amount, Money::from_minor(4200));
    }

    #[tokio::test]
    async fn failing_bridge_surfaces_backend_error_and_records_nothing() {
        let bridge = InMemoryPaymentBridge::new();
        bridge.set_fail_on_generate(true);

        let result = bridge
            .generate_payment_link(OrderId::new(), "buyer@example.com", Money::from_minor(1000))
            .await;

        assert!(matches!(
            result,
            Err(CheckoutError::PaymentBackend { status: 502, .. })
        ));
        assert_eq!(bridge.request_count(), 0);
    }

    #[test]
    fn payment_link_uses_camel_case_wire_names() {
        let link = PaymentLink {
            authorization_url: "https://pay.example/ac".to_string(),
            access_code: "ac".to_string(),
            reference: "ref".to_string(),
        };
        let json = serde_json::to_value(&link).unwrap();
        assert!(json.get("authorizationUrl").is_some());
        assert!(json.get("accessCode").is_some());
    }
}
