use std::sync::Arc;

use mimalloc::MiMalloc;
use scanbridge::config::AppConfig;
use scanbridge::services::importer::LairImporter;
use scanbridge::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scanbridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env();
    if config.importer.api_server.is_none() {
        tracing::warn!("LAIR_API_SERVER is not set; uploads will fail at import");
    }

    let importer = LairImporter::new(&config.importer)?;
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        config,
        importer: Arc::new(importer),
    };

    let app = scanbridge::routes::router(state);

    tracing::info!(host = %addr, "Starting scanbridge upload server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
