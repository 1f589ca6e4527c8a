//! Tool registry and dispatcher.
//!
//! Each tool takes a JSON arguments object and answers with a single
//! text payload; errors are reported through the `is_error` flag rather
//! than a structured code, so an agent can always read the response.

use catalog::{CatalogGateway, ItemSearch};
use checkout::{issue_payment_link, LineRequest, OrderCoordinator, PaymentBridge};
use chrono::{DateTime, Utc};
use common::{ItemId, OrderId, SellerId};
use ledger::{OrderLedger, OrderStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One incoming tool invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    /// Opaque correlation id echoed back in the reply.
    #[serde(default)]
    pub id: Option<Value>,
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// The reply to a tool invocation: one text payload plus an error flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub content: String,
    pub is_error: bool,
}

// -- Tool argument types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSellersArgs {
    limit: Option<u32>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemsArgs {
    query: String,
    limit: Option<u32>,
    seller_id: Option<SellerId>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemDetailArgs {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderArgs {
    items: Vec<LineRequest>,
    customer_email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderIdArgs {
    order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentStatusReply {
    status: OrderStatus,
    paid_at: Option<DateTime<Utc>>,
}

/// Routes tool calls to the catalog gateway and the checkout core.
pub struct ToolRouter<L, C, B> {
    catalog: C,
    coordinator: OrderCoordinator<L, C>,
    bridge: B,
}

impl<L, C, B> ToolRouter<L, C, B>
where
    L: OrderLedger,
    C: CatalogGateway + Clone,
    B: PaymentBridge,
{
    /// Creates a router over the given collaborators.
    pub fn new(ledger: L, catalog: C, bridge: B, currency: impl Into<String>) -> Self {
        let coordinator = OrderCoordinator::new(ledger, catalog.clone(), currency);
        Self {
            catalog,
            coordinator,
            bridge,
        }
    }

    /// Dispatches one call and always produces a reply.
    #[tracing::instrument(skip(self, call), fields(tool = %call.tool))]
    pub async fn dispatch(&self, call: ToolCall) -> ToolReply {
        match self.invoke(&call.tool, call.arguments).await {
            Ok(content) => ToolReply {
                id: call.id,
                content,
                is_error: false,
            },
            Err(message) => {
                tracing::warn!(tool = %call.tool, %message, "tool call failed");
                ToolReply {
                    id: call.id,
                    content: message,
                    is_error: true,
                }
            }
        }
    }

    async fn invoke(&self, tool: &str, arguments: Value) -> Result<String, String> {
        match tool {
            "list_sellers" => prefix("Error listing sellers", self.list_sellers(arguments).await),
            "search_items" => prefix("Error searching items", self.search_items(arguments).await),
            "get_item_details" => prefix(
                "Error fetching item details",
                self.get_item_details(arguments).await,
            ),
            "create_order" => prefix("Error creating order", self.create_order(arguments).await),
            "generate_payment_link" => prefix(
                "Error generating payment link",
                self.generate_payment_link(arguments).await,
            ),
            "check_payment_status" => prefix(
                "Error checking payment status",
                self.check_payment_status(arguments).await,
            ),
            other => Err(format!("Unknown tool: {other}")),
        }
    }

    async fn list_sellers(&self, arguments: Value) -> Result<String, String> {
        let args: ListSellersArgs = parse_args(arguments)?;
        let sellers = self
            .catalog
            .list_sellers(args.limit, args.category.as_deref())
            .await
            .map_err(stringify)?;
        to_pretty_json(&sellers)
    }

    async fn search_items(&self, arguments: Value) -> Result<String, String> {
        let args: SearchItemsArgs = parse_args(arguments)?;
        let search = ItemSearch {
            query: args.query,
            limit: args.limit,
            seller_id: args.seller_id,
            category: args.category,
        };
        let items = self.catalog.search_items(&search).await.map_err(stringify)?;
        to_pretty_json(&items)
    }

    async fn get_item_details(&self, arguments: Value) -> Result<String, String> {
        let args: ItemDetailArgs = parse_args(arguments)?;
        let item = self
            .catalog
            .get_item(&args.id)
            .await
            .map_err(stringify)?
            .ok_or_else(|| format!("Item not found: {}", args.id))?;
        to_pretty_json(&item)
    }

    async fn create_order(&self, arguments: Value) -> Result<String, String> {
        let args: CreateOrderArgs = parse_args(arguments)?;
        let receipt = self
            .coordinator
            .create_order(args.items, args.customer_email)
            .await
            .map_err(stringify)?;
        to_pretty_json(&receipt)
    }

    async fn generate_payment_link(&self, arguments: Value) -> Result<String, String> {
        let args: OrderIdArgs = parse_args(arguments)?;
        let link = issue_payment_link(&self.coordinator, &self.bridge, args.order_id)
            .await
            .map_err(stringify)?;
        to_pretty_json(&link)
    }

    async fn check_payment_status(&self, arguments: Value) -> Result<String, String> {
        let args: OrderIdArgs = parse_args(arguments)?;
        let view = self
            .coordinator
            .get_order_status(args.order_id)
            .await
            .map_err(stringify)?;
        to_pretty_json(&PaymentStatusReply {
            status: view.status,
            paid_at: view.paid_at,
        })
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {e}"))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(stringify)
}

fn stringify(error: impl std::fmt::Display) -> String {
    error.to_string()
}

fn prefix(context: &str, result: Result<String, String>) -> Result<String, String> {
    result.map_err(|message| format!("{context}: {message}"))
}
