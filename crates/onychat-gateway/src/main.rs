use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use onychat_core::config::OnychatConfig;
use onychat_gateway::{
    app,
    auth::HmacTokenVerifier,
    cli::{Cli, Command},
};
use tracing::{info, warn};

/// How long to wait for the hub to drain after the listener stops.
const HUB_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "onychat_gateway=info,onychat_hub=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > ONYCHAT_CONFIG env > ~/.onychat/onychat.toml
    let config = OnychatConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        OnychatConfig::default()
    });

    match cli.command.unwrap_or(Command::Serve) {
        Command::Token { identity, ttl_secs } => {
            let ttl = Duration::from_secs(ttl_secs.unwrap_or(config.auth.token_ttl_secs));
            let token = HmacTokenVerifier::new(&config.auth.secret).issue(&identity, ttl)?;
            println!("{token}");
            Ok(())
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: OnychatConfig) -> anyhow::Result<()> {
    let db_path = config.database.path.clone();
    ensure_parent_dir(&db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(&db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;

    // schema migrations (idempotent)
    onychat_users::db::init_db(&db)?;
    onychat_messages::db::init_db(&db)?;
    info!("database migrations complete");

    // each subsystem gets its own connection
    let profiles = onychat_users::ProfileStore::new(rusqlite::Connection::open(&db_path)?);
    let log = onychat_messages::MessageLog::new(rusqlite::Connection::open(&db_path)?);

    let (hub, hub_task) = app::spawn_hub(config.hub, Arc::new(log));

    if config.auth.is_insecure() {
        warn!("auth.secret is the shipped default; set ONYCHAT_AUTH__SECRET before exposing this server");
    }
    let verifier = Arc::new(HmacTokenVerifier::new(&config.auth.secret));

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(app::AppState::new(config, hub, profiles, verifier));
    let router = app::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Onychat gateway listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the hub loop exits once the last handle is gone
    drop(state);
    match tokio::time::timeout(HUB_SHUTDOWN_GRACE, hub_task).await {
        Ok(Ok(())) => info!("hub stopped"),
        Ok(Err(e)) => warn!(error = %e, "hub task failed"),
        Err(_) => warn!("hub still has live connections; exiting anyway"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
