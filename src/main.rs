use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use alertd::api::{create_router, AppState};
use alertd::config::Config;
use alertd::observability::{init_tracing, MetricsRegistry};
use alertd::registry::{loader, RegistryController, RuleRegistry};
use alertd::storage::{MemoryRuleStore, PostgresRuleStore, RuleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting alertd rule registry"
    );

    let store = open_store(&config).await?;

    // The registry is only kept current by controller hooks, so it must
    // start from what the store holds.
    let registry = Arc::new(RuleRegistry::new());
    loader::rebuild(store.as_ref(), &registry).await?;

    let feed_handle = tokio::spawn(log_registry_changes(registry.subscribe()));

    let metrics = Arc::new(MetricsRegistry::new());
    let controller = RegistryController::new(store, registry, metrics.clone());
    let state = Arc::new(AppState::new(controller, metrics));

    // Create router
    let app = create_router(state);

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        let (signalled_tx, mut signalled_rx) = watch::channel(false);
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(true);
        });

        let timeout = config.shutdown_timeout();
        tokio::select! {
            result = server.into_future() => result?,
            _ = async {
                let _ = signalled_rx.wait_for(|signalled| *signalled).await;
                tokio::time::sleep(timeout).await;
            } => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "Graceful shutdown timed out, dropping open connections"
                );
            }
        }
    } else {
        axum::serve(listener, app).await?;
    }

    // Cleanup
    info!("Shutting down...");
    feed_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RuleStore>> {
    let Some(url) = config.database_url.as_deref().filter(|_| config.uses_database()) else {
        warn!("No database configured, alert rules will not survive a restart");
        return Ok(Arc::new(MemoryRuleStore::new()));
    };

    let store = PostgresRuleStore::connect(
        url,
        config.db_min_connections,
        config.db_max_connections,
    )
    .await?;

    if config.run_migrations {
        store.run_migrations().await?;
        info!("Database migrations applied");
    }

    Ok(Arc::new(store))
}

async fn log_registry_changes(mut rx: watch::Receiver<u64>) {
    while rx.changed().await.is_ok() {
        let generation = *rx.borrow_and_update();
        debug!(generation = generation, "Alert rule registry changed");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
