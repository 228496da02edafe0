use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the storage backend. Returns the payload and whether the backend answered.
pub async fn health_status(state: &SharedState) -> (bool, HealthResponse) {
    match state.game_store().health_check().await {
        Ok(()) => (true, HealthResponse::ok()),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            (false, HealthResponse::unavailable())
        }
    }
}
