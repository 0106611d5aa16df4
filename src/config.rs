use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub auth: AuthConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub calcom: CalcomConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingsConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Output dimensionality of the configured model. The vector column is
    /// sized to this at schema bootstrap; switching to a model with a
    /// different dimension requires a data migration.
    pub dimension: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_ttl_minutes: i64,
    pub google_client_id: String,
    pub google_client_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub model_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalcomConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub event_type_id: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestionConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
}

impl AppConfig {
    pub fn build() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.rust_log", "info,noavoice=debug")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 30)?
            .set_default("embeddings.api_url", "https://api.openai.com/v1/embeddings")?
            .set_default("embeddings.model", "text-embedding-3-small")?
            .set_default("embeddings.dimension", 1536)?
            .set_default("llm.api_url", "https://api.openai.com/v1/chat/completions")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.temperature", 0.2)?
            .set_default("auth.token_ttl_minutes", 60 * 24)?
            .set_default("elevenlabs.model_id", "eleven_multilingual_v2")?
            .set_default("calcom.base_url", "https://api.cal.com/v2")?
            .set_default("calcom.api_version", "2024-08-13")?
            .set_default("ingestion.chunk_size", 4000)?
            // E.g. `APP__DATABASE__URL=postgres://...` sets `DatabaseConfig.url`
            .add_source(Environment::default().separator("__").prefix("APP"));

        builder.build()?.try_deserialize()
    }
}
