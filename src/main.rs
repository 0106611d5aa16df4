mod auth;
mod config;
mod db;
mod embeddings;
mod errors;
mod ingestion;
mod integrations;
mod llm;
mod metrics;
mod routes;
mod services;
mod tts;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = config::AppConfig::build()?;

    // 2. Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.rust_log))
        .init();

    tracing::info!("Starting NoaVoice backend...");

    // 3. Initialize database and bootstrap schema
    let repo = db::Repository::new(&config.database).await?;
    repo.init_schema(config.embeddings.dimension).await?;
    tracing::info!("Connected to database");

    // 4. Initialize providers. An api key of "mock" selects the in-process
    //    mock implementations for local development.
    let embedder: Arc<dyn embeddings::Embedder> = if config.embeddings.api_key == "mock" {
        Arc::new(embeddings::MockEmbedder::new(config.embeddings.dimension))
    } else {
        Arc::new(embeddings::OpenAiEmbedder::new(config.embeddings.clone()))
    };

    let chat: Arc<dyn llm::ChatModel> = if config.llm.api_key == "mock" {
        Arc::new(llm::MockChatModel::default())
    } else {
        Arc::new(llm::OpenAiChatModel::new(config.llm.clone()))
    };

    // 5. Build application state (services)
    let state = services::AppState::new(repo, embedder, chat, &config);

    // 6. Setup router
    let app = routes::create_router(state);

    // 7. Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
