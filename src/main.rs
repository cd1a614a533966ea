//! Kitchen AIOps scoring service
//!
//! Trains an isolation-forest baseline on the recent tail of the kitchen
//! order log and flags per-region incidents from the latest activity.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kitchen_aiops::config::Config;
use kitchen_aiops::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kitchen_aiops=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("kitchen-aiops starting...");
    tracing::info!(
        log = %config.log_path.display(),
        model = %config.model_path.display(),
        "configured sources"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = server::create_router(AppState::new(config));

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
