pub mod appointments;
pub mod assistants;
pub mod auth;
pub mod configure;
pub mod knowledge;
pub mod prompts;
pub mod voice;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics;
use crate::services::AppState;

/// Upload size cap in bytes.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "NoaVoice backend running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn create_router(state: AppState) -> Router {
    let (prometheus_layer, metrics_router) = metrics::setup_metrics();

    let api = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // OAuth
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        // Assistants
        .route(
            "/agents",
            post(assistants::create_agent).get(assistants::list_agents),
        )
        .route(
            "/agents/{agent_id}",
            get(assistants::get_agent)
                .put(assistants::update_agent)
                .delete(assistants::delete_agent),
        )
        // Prompt section
        .route(
            "/agents/{agent_id}/prompt",
            get(prompts::get_prompt)
                .post(prompts::set_prompt)
                .delete(prompts::delete_prompt),
        )
        // Configure section
        .route(
            "/assistants/{assistant_id}/configure",
            get(configure::get_configure)
                .put(configure::update_configure)
                .delete(configure::reset_configure),
        )
        // Global knowledge base
        .route("/knowledge/upload", post(knowledge::upload))
        .route(
            "/knowledge",
            get(knowledge::list_knowledge).delete(knowledge::delete_all_knowledge),
        )
        .route("/knowledge/stats", get(knowledge::knowledge_stats))
        .route("/knowledge/query", post(knowledge::query_knowledge))
        .route("/knowledge/{knowledge_id}", delete(knowledge::delete_knowledge))
        // Voice preview
        .route("/voice/preview", post(voice::preview))
        // Appointments
        .route("/appointments/slots", get(appointments::available_slots))
        .route("/appointments", post(appointments::book))
        .route("/appointments/{booking_uid}", get(appointments::get_booking))
        .route(
            "/appointments/{booking_uid}/cancel",
            post(appointments::cancel_booking),
        )
        .route(
            "/appointments/{booking_uid}/reschedule",
            post(appointments::reschedule_booking),
        )
        .with_state(state);

    Router::new().merge(api).merge(metrics_router).layer(
        ServiceBuilder::new()
            .layer(prometheus_layer)
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}
