//! Logo Quiz Back binary entrypoint wiring REST, SSE and the catalog data source.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logo_quiz_back::{
    config::AppConfig,
    dao::catalog_store::memory::InMemoryCatalogStore,
    routes,
    services::session_service,
    state::{AppState, SharedState},
};

/// Seed file for the in-memory store, used when no remote data source is configured.
const CATALOG_SEED_ENV: &str = "CATALOG_SEED_PATH";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    start_catalog_store(app_state.clone()).await?;
    tokio::spawn(session_service::run_session_reaper(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the catalog store: the PostgREST backend under a supervisor when Supabase is
/// configured, otherwise the in-memory store.
async fn start_catalog_store(state: SharedState) -> anyhow::Result<()> {
    #[cfg(feature = "postgrest-store")]
    {
        use logo_quiz_back::{
            dao::{
                catalog_store::{
                    CatalogStore,
                    postgrest::{PostgrestCatalogStore, PostgrestConfig},
                },
                storage::StorageError,
            },
            services::storage_supervisor,
        };

        match PostgrestConfig::from_env() {
            Ok(config) => {
                info!(url = %config.base_url, "using Supabase data source");
                tokio::spawn(storage_supervisor::run(state, move || {
                    let config = config.clone();
                    async move {
                        PostgrestCatalogStore::connect(config)
                            .await
                            .map(|store| Arc::new(store) as Arc<dyn CatalogStore>)
                            .map_err(StorageError::from)
                    }
                }));
                return Ok(());
            }
            Err(err) => info!(reason = %err, "Supabase not configured"),
        }
    }

    let store = match env::var(CATALOG_SEED_ENV) {
        Ok(path) => InMemoryCatalogStore::from_seed_file(&path)
            .with_context(|| format!("loading catalog seed from `{path}`"))?,
        Err(_) => {
            warn!("no data source configured; serving an empty in-memory catalog");
            InMemoryCatalogStore::default()
        }
    };
    info!("using in-memory data source");
    state.install_catalog_store(Arc::new(store)).await;
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
