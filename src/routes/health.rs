use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{dto::health::HealthResponse, services::health_service, state::SharedState};

/// Report whether the storage backend is reachable.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    match health_service::health_status(&state).await {
        (true, body) => (StatusCode::OK, Json(body)),
        (false, body) => (StatusCode::SERVICE_UNAVAILABLE, Json(body)),
    }
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/health", get(health))
}
