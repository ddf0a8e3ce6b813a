use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storekeeper::config::Config;
use storekeeper::db::{self, AppState};
use storekeeper::handlers;
use storekeeper::receipt::MockAppleValidator;
use storekeeper::seed;

#[derive(Parser, Debug)]
#[command(name = "storekeeper")]
#[command(about = "In-app purchase backend")]
struct Cli {
    /// Reset the demo catalog and demo user, then exit
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storekeeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let db = match db::shared(&config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if cli.seed {
        if let Err(e) = seed::run(db.as_ref()).await {
            tracing::error!("Seed failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let state = AppState {
        db,
        validator: Arc::new(MockAppleValidator::new(config.receipt_mock_delay)),
    };

    let app = handlers::app(state);

    let addr = config.addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Storekeeper listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
