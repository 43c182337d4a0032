pub mod memory;
#[cfg(feature = "postgrest-store")]
pub mod postgrest;

use crate::dao::models::{LeaderboardEntryEntity, LogoEntity, NewLeaderboardEntry, QuestionEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the managed data source holding the catalogs and the leaderboard.
pub trait CatalogStore: Send + Sync {
    /// Fetch every row of the logo catalog.
    fn fetch_logos(&self) -> BoxFuture<'static, StorageResult<Vec<LogoEntity>>>;
    /// Fetch every row of the question catalog.
    fn fetch_questions(&self) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
    /// Append one leaderboard row.
    fn append_score(&self, entry: NewLeaderboardEntry) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch up to `limit` leaderboard rows ordered by score descending.
    fn top_scores(&self, limit: usize)
    -> BoxFuture<'static, StorageResult<Vec<LeaderboardEntryEntity>>>;
    /// Cheap round-trip used by the supervisor and the health route.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish whatever the backend needs after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
