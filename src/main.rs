use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopd::auth::{AuthService, TokenService};
use shopd::config::Config;
use shopd::AppState;

#[derive(Parser, Debug)]
#[command(name = "shopd")]
#[command(author, version, about = "A lightweight e-commerce catalog server", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shopd.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting shopd v{}", env!("CARGO_PKG_VERSION"));

    // Refuse to start without an externally configured signing secret
    let jwt_secret = config.jwt_secret()?.to_string();

    // Ensure data directories exist
    std::fs::create_dir_all(&config.server.data_dir)?;
    std::fs::create_dir_all(&config.uploads.dir)?;

    // Initialize database
    let db = shopd::db::init(&config.server.data_dir).await?;

    // Wire up the auth service
    let tokens = TokenService::new(&jwt_secret, config.auth.token_ttl_hours);
    let auth = AuthService::new(db.clone(), tokens);

    let state = Arc::new(AppState::new(config.clone(), db, auth));
    let app = shopd::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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

    tracing::info!("Shutdown signal received");
}
