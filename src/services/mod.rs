use std::sync::Arc;

use crate::auth::google::GoogleOAuth;
use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::db::{KnowledgeStore, Repository};
use crate::embeddings::Embedder;
use crate::integrations::calcom::CalcomClient;
use crate::llm::ChatModel;
use crate::tts::ElevenLabsClient;

pub mod appointments;
pub mod assistants;
pub mod knowledge;
pub mod rag;

use appointments::AppointmentService;
use assistants::AssistantService;
use knowledge::KnowledgeService;
use rag::RagService;

/// Container for all services, injected into routes. Constructed once at
/// startup; no ambient singletons.
#[derive(Clone)]
pub struct AppState {
    pub assistants: Arc<AssistantService>,
    pub knowledge: Arc<KnowledgeService>,
    pub rag: Arc<RagService>,
    pub appointments: Arc<AppointmentService>,
    pub jwt: Arc<JwtManager>,
    pub google: Arc<GoogleOAuth>,
    pub tts: Arc<ElevenLabsClient>,
    pub repo: Repository,
}

impl AppState {
    pub fn new(
        repo: Repository,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        config: &AppConfig,
    ) -> Self {
        // Repository is cheap to clone (connection pool inside)
        let store: Arc<dyn KnowledgeStore> = Arc::new(repo.clone());
        Self {
            assistants: Arc::new(AssistantService::new(repo.clone())),
            knowledge: Arc::new(KnowledgeService::new(
                store.clone(),
                embedder.clone(),
                config.ingestion.chunk_size,
            )),
            rag: Arc::new(RagService::new(store, embedder, chat)),
            appointments: Arc::new(AppointmentService::new(
                CalcomClient::new(config.calcom.clone()),
                repo.clone(),
            )),
            jwt: Arc::new(JwtManager::new(
                &config.auth.secret_key,
                config.auth.token_ttl_minutes,
            )),
            google: Arc::new(GoogleOAuth::new(&config.auth)),
            tts: Arc::new(ElevenLabsClient::new(config.elevenlabs.clone())),
            repo,
        }
    }
}
