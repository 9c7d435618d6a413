use std::net::SocketAddr;

use sqlx::any::AnyPoolOptions;

use stockfolio::services::firebase::FirebaseClient;
use stockfolio::services::market::YahooClient;
use stockfolio::services::ollama::OllamaClient;
use stockfolio::services::qdrant::QdrantClient;
use stockfolio::services::trading_service::TradeLocks;
use stockfolio::{config, routes, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    sqlx::any::install_default_drivers();
    let db = AnyPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");

    // Gateway clients are built exactly once here and shared via AppState.
    let state = AppState {
        db,
        market: YahooClient::new(),
        firebase: FirebaseClient::new(settings.firebase_api_key.clone()),
        qdrant: QdrantClient::new(
            settings.qdrant_url.clone(),
            settings.qdrant_collection.clone(),
        ),
        ollama: OllamaClient::new(
            settings.ollama_url.clone(),
            settings.ollama_model.clone(),
            settings.ollama_embed_model.clone(),
        ),
        trade_locks: TradeLocks::new(),
        settings: settings.clone(),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings
            .host
            .parse::<std::net::IpAddr>()
            .expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
