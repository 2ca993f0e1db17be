//! Votes Ledger Main Entry Point
//!
//! Serves the vote and reputation ledger over HTTP and runs the relay that
//! moves committed interactions from the outbox into the interaction log.

use dotenv::dotenv;
use std::env;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use votes_ledger::server::{create_app, run_server};
use votes_ledger::{Dependencies, LedgerAppError, LedgerConfig};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), LedgerAppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("votes_ledger=info,votes_ledger_pipeline=info"));

    let json = env::var("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
    };
    result.map_err(|e| LedgerAppError::Tracing(e.to_string()))?;

    info!(
        service_name = "votes-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), LedgerAppError> {
    dotenv().ok();

    init_tracing()?;

    let config = LedgerConfig::from_env()?;
    info!(bind_addr = %config.bind_addr, "Starting votes ledger");

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay = deps.relay;
    let relay_handle = tokio::spawn(async move { relay.run(shutdown_rx).await });

    let app = create_app(deps.service);
    let served = run_server(app, config.bind_addr, shutdown_signal()).await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = relay_handle.await {
        error!(error = %e, "Interaction relay task failed");
    }
    deps.pool.close().await;

    match served {
        Ok(()) => {
            info!("Votes ledger stopped");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            Err(e)
        }
    }
}
