use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saj::auth::password::Argon2Hasher;
use saj::auth::token::JwtIssuer;
use saj::cli::{run_command, Cli};
use saj::config::Config;
use saj::services::users::ensure_admin_user;
use saj::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.command.is_some() {
        return run_command(&cli);
    }

    // Load configuration
    let mut config = Config::load(&cli.config)?;

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

    tracing::info!("Starting saj v{}", env!("CARGO_PKG_VERSION"));

    config.resolve_jwt_secret(cli.jwt_secret.clone());

    // Initialize database
    let db = saj::db::init(&config.database).await?;

    let hasher = Arc::new(Argon2Hasher::default());
    let tokens = Arc::new(
        JwtIssuer::from_config(&config.auth).context("Failed to set up token signing")?,
    );

    let state = Arc::new(
        AppState::new(config.clone(), db, hasher, tokens)
            .context("Failed to initialize services")?,
    );

    // Ensure an administrator exists on a fresh database
    if let Some(password) = &config.auth.admin_password {
        ensure_admin_user(&state.users, &config.auth.admin_username, password)
            .await
            .context("Failed to create the initial administrator")?;
    }

    let app = saj::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
