use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paysync::config::Config;
use paysync::db::{create_pool, init_db, AppState};
use paysync::handlers;
use paysync::splynx::SplynxWebhookVerifier;
use paysync::sync;
use paysync::uisp::UispClient;

#[derive(Parser, Debug)]
#[command(name = "paysync")]
#[command(about = "Payment webhook bridge between Splynx billing and UISP")]
struct Cli {
    /// Run a full client sync in the background after startup
    #[arg(long)]
    sync_on_start: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paysync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.splynx.webhook_secret.is_empty() {
        tracing::warn!("SPLYNX_WEBHOOK_SECRET is empty; all webhooks will be rejected");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        uisp: UispClient::new(&config.uisp),
        verifier: SplynxWebhookVerifier::new(&config.splynx),
    };

    if cli.sync_on_start {
        tracing::info!("Starting initial client sync");
        sync::spawn_full_sync(state.clone());
    }

    let app = Router::new()
        .merge(handlers::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Paysync server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
