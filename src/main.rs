use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tcelflow::{
    AppConfig, AppState, ConfirmationQueue, DurableStore, FallbackStore, NotificationCenter,
    PersistenceStore, create_router,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tcelflow", version, about = "Task tracker with dual-backend local persistence")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting TcelFlow v{}", env!("CARGO_PKG_VERSION"));

    let notifier = NotificationCenter::new();
    let dialogs = ConfirmationQueue::new();

    let durable = DurableStore::new(config.storage.durable_dir.clone());
    let fallback = FallbackStore::open(
        config.storage.fallback_file.clone(),
        config.storage.fallback_quota_bytes,
    );
    let store = PersistenceStore::new(durable, fallback, notifier.clone());
    store.load().await;

    let state = AppState {
        store,
        dialogs,
        notifier,
    };
    let app = create_router(state, config.server.ui_dir.as_deref());

    let addr = config.server_addr();
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
