//! Newline-delimited JSON transport over stdin/stdout.
//!
//! One request per line, one reply per line, one outstanding call at a
//! time. Logs go to stderr; stdout carries only replies.

use catalog::CatalogGateway;
use checkout::PaymentBridge;
use ledger::OrderLedger;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::tools::{ToolCall, ToolReply, ToolRouter};

/// Serves tool calls from stdin until it closes.
pub async fn serve<L, C, B>(router: &ToolRouter<L, C, B>) -> std::io::Result<()>
where
    L: OrderLedger,
    C: CatalogGateway + Clone,
    B: PaymentBridge,
{
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => router.dispatch(call).await,
            Err(e) => ToolReply {
                id: None,
                content: format!("Invalid request: {e}"),
                is_error: true,
            },
        };

        write_reply(&mut stdout, &reply).await?;
    }

    tracing::info!("stdin closed, transport loop done");
    Ok(())
}

async fn write_reply(
    stdout: &mut tokio::io::Stdout,
    reply: &ToolReply,
) -> std::io::Result<()> {
    // ToolReply holds only strings and a bool; serialization cannot
    // produce invalid JSON, but a fallback keeps the channel alive.
    let payload = serde_json::to_string(reply).unwrap_or_else(|_| {
        "{\"content\":\"Internal serialization error\",\"isError\":true}".to_string()
    });

    stdout.write_all(payload.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
