use banko::{
    config::AppConfig,
    game::{self, InMemoryGameStore, RandomDiceRoller, RandomJoinCodeGenerator, ServiceOptions},
    shared::AppState,
};
use std::error::Error;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banko=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    info!(?config, "Starting Banko game server");

    let app_state = AppState::new(
        Arc::new(InMemoryGameStore::new()),
        Arc::new(RandomDiceRoller::new()),
        Arc::new(RandomJoinCodeGenerator::new()),
        ServiceOptions::from(&config),
    );

    let app = game::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
