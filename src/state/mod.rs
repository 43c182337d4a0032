pub mod game;
pub mod game_loop;
pub mod screen_flow;
pub mod session;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig, dao::catalog_store::CatalogStore, error::ServiceError,
    services::sse_events::broadcast_system_status, state::session::PlayerSession,
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

const PUBLIC_EVENTS_CAPACITY: usize = 16;

/// Central application state: data source handle, player sessions and configuration.
pub struct AppState {
    catalog_store: RwLock<Option<Arc<dyn CatalogStore>>>,
    config: AppConfig,
    sessions: DashMap<Uuid, PlayerSession>,
    public_sse: SseHub,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a catalog store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            catalog_store: RwLock::new(None),
            config,
            sessions: DashMap::new(),
            public_sse: SseHub::new(PUBLIC_EVENTS_CAPACITY),
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current catalog store, if one is installed.
    pub async fn catalog_store(&self) -> Option<Arc<dyn CatalogStore>> {
        let guard = self.catalog_store.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`Self::catalog_store`] but failing with [`ServiceError::Degraded`].
    pub async fn require_catalog_store(&self) -> Result<Arc<dyn CatalogStore>, ServiceError> {
        self.catalog_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new catalog store implementation and leave degraded mode.
    pub async fn install_catalog_store(&self, store: Arc<dyn CatalogStore>) {
        {
            let mut guard = self.catalog_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current catalog store and enter degraded mode.
    pub async fn clear_catalog_store(&self) {
        {
            let mut guard = self.catalog_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag and broadcast it when the value changes.
    pub fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });

        if changed {
            broadcast_system_status(&self.public_sse, value);
        }
    }

    /// Live player sessions keyed by their identifier.
    pub fn sessions(&self) -> &DashMap<Uuid, PlayerSession> {
        &self.sessions
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.public_sse
    }
}
