use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dayplan_db::store::{MemoryTodoStore, PgTodoStore, TodoStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dayplan_api::config::ServerConfig;
use dayplan_api::router::build_app_router;
use dayplan_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dayplan_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = connect_store(&config).await;

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Once a signal arrives, in-flight requests get `shutdown_timeout_secs`
    // to finish before the process exits anyway.
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let (signalled_tx, mut signalled_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(true);
    });
    let drain_deadline = async move {
        let _ = signalled_rx.wait_for(|signalled| *signalled).await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server.into_future() => result.expect("Server error"),
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "In-flight requests did not drain before the shutdown timeout",
            );
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Pick the todo store: PostgreSQL when `DATABASE_URL` is set, otherwise an
/// in-memory store.
///
/// Panics if the database is configured but unreachable or cannot be
/// migrated; a misconfigured deployment should fail fast.
async fn connect_store(config: &ServerConfig) -> Arc<dyn TodoStore> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, todos are kept in memory and lost on restart");
        return Arc::new(MemoryTodoStore::new());
    };

    let pool = dayplan_db::create_pool(database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    dayplan_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    dayplan_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    Arc::new(PgTodoStore::new(pool))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
