//! In-process catalog store seeded from a JSON file; used offline and by the tests.

use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::dao::{
    catalog_store::CatalogStore,
    models::{LeaderboardEntryEntity, LogoEntity, NewLeaderboardEntry, QuestionEntity},
    storage::{StorageError, StorageResult},
};

/// Failures while reading a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid seed document.
    #[error("failed to parse seed file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON layout of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    /// Logo catalog rows.
    #[serde(default)]
    pub logos: Vec<LogoEntity>,
    /// Question catalog rows.
    #[serde(default)]
    pub questions: Vec<QuestionEntity>,
    /// Pre-existing leaderboard rows.
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntryEntity>,
}

#[derive(Debug, Error)]
#[error("simulated append failure")]
struct SimulatedFailure;

/// Catalog store kept entirely in memory. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    logos: Arc<Vec<LogoEntity>>,
    questions: Arc<Vec<QuestionEntity>>,
    leaderboard: Arc<RwLock<Vec<LeaderboardEntryEntity>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryCatalogStore {
    /// Build a store from already-parsed catalogs.
    pub fn new(seed: CatalogSeed) -> Self {
        Self {
            logos: Arc::new(seed.logos),
            questions: Arc::new(seed.questions),
            leaderboard: Arc::new(RwLock::new(seed.leaderboard)),
            fail_appends: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Load a store from a JSON seed file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let seed = serde_json::from_str::<CatalogSeed>(&contents).map_err(|source| {
            SeedError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;
        Ok(Self::new(seed))
    }

    /// Make every following append fail (or succeed again).
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Every leaderboard row in insertion order.
    pub async fn leaderboard_rows(&self) -> Vec<LeaderboardEntryEntity> {
        self.leaderboard.read().await.clone()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn fetch_logos(&self) -> BoxFuture<'static, StorageResult<Vec<LogoEntity>>> {
        let logos = self.logos.clone();
        Box::pin(async move { Ok(logos.as_ref().clone()) })
    }

    fn fetch_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let questions = self.questions.clone();
        Box::pin(async move { Ok(questions.as_ref().clone()) })
    }

    fn append_score(&self, entry: NewLeaderboardEntry) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.fail_appends.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable(
                    "append leaderboard row".into(),
                    SimulatedFailure,
                ));
            }
            store.leaderboard.write().await.push(LeaderboardEntryEntity {
                username: entry.username,
                score: entry.score,
                created_at: OffsetDateTime::now_utc(),
            });
            Ok(())
        })
    }

    fn top_scores(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<LeaderboardEntryEntity>>> {
        let leaderboard = self.leaderboard.clone();
        Box::pin(async move {
            let mut rows = leaderboard.read().await.clone();
            // Stable sort: equal scores keep the older row first.
            rows.sort_by(|a, b| b.score.cmp(&a.score));
            rows.truncate(limit);
            Ok(rows)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
