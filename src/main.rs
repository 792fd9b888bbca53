use sponsorhub::api::{build_router, AppState};
use sponsorhub::config::Config;
use sponsorhub::datasource::{DataSource, PostgrestClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sponsorhub=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to the hosted data platform
    let store: Arc<dyn DataSource> = Arc::new(PostgrestClient::new(
        &config.data_api_url,
        &config.data_api_key,
    ));
    tracing::info!("Data platform client ready for {}", config.data_api_url);

    // Build router
    let state = AppState {
        store,
        admin_token: config.admin_api_token.clone(),
    };
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
