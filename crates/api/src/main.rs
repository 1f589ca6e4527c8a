//! Agent tool server entry point.

use api::{transport, Config, ToolRouter};
use catalog::PostgresCatalog;
use checkout::HttpPaymentBridge;
use ledger::PostgresLedger;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, shutting down");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 1. Initialize tracing. Logs go to stderr: stdout is the message
    //    channel.
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 2. Connect storage and run migrations
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let ledger = PostgresLedger::new(pool.clone());
    ledger.run_migrations().await.expect("migrations failed");
    let catalog = PostgresCatalog::new(pool);

    // 3. Wire the tool router
    let bridge = HttpPaymentBridge::new(config.payment_api_url.clone());
    let router = ToolRouter::new(ledger, catalog, bridge, config.currency.clone());

    tracing::info!(currency = %config.currency, "agent tool server ready");

    // 4. Serve until stdin closes or a signal arrives
    tokio::select! {
        result = transport::serve(&router) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "transport failed");
            }
        }
        () = shutdown_signal() => {}
    }

    tracing::info!("server shut down");
}
