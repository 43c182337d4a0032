use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a static health payload while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_catalog_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "data source health check failed");
            }
        }
        Err(_) => warn!("data source unavailable (degraded mode)"),
    }

    HealthResponse::new(state.is_degraded(), state.sessions().len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::catalog_store::memory::InMemoryCatalogStore, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert_eq!(health.sessions, 0);

        state
            .install_catalog_store(Arc::new(InMemoryCatalogStore::default()))
            .await;
        assert_eq!(health_status(&state).await.status, "ok");
    }
}
