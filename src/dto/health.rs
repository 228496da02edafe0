use serde::Serialize;

/// Health payload returned by the `/health` route.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status ("ok" or "unavailable").
    pub status: &'static str,
}

impl HealthResponse {
    /// The storage backend answered its probe.
    pub fn ok() -> Self {
        Self { status: "ok" }
    }

    /// The storage backend could not be reached.
    pub fn unavailable() -> Self {
        Self {
            status: "unavailable",
        }
    }
}
