use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Player sessions currently held in memory.
    pub sessions: usize,
}

impl HealthResponse {
    /// Describe the service given its degraded flag and live session count.
    pub fn new(degraded: bool, sessions: usize) -> Self {
        let status = if degraded { "degraded" } else { "ok" };
        Self {
            status: status.to_string(),
            sessions,
        }
    }
}
