//! Leaderboard queries: fetch the top rows, keep each player's best, truncate for display.

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    dao::models::LeaderboardEntryEntity,
    dto::leaderboard::{LeaderboardEntry, LeaderboardResponse, LeaderboardView},
    state::SharedState,
};

/// Keep the first occurrence of each username and stop after `limit` players.
///
/// `entries` must already be ordered by score descending, so the first occurrence is the best.
pub fn top_unique(entries: Vec<LeaderboardEntryEntity>, limit: usize) -> Vec<LeaderboardEntryEntity> {
    let mut unique = IndexMap::with_capacity(limit);
    for entry in entries {
        if unique.len() >= limit {
            break;
        }
        unique.entry(entry.username.clone()).or_insert(entry);
    }
    unique.into_values().collect()
}

/// Fetch and post-process the leaderboard for a view.
///
/// A fetch failure or a missing store is logged and yields an empty, unavailable board: the
/// leaderboard is never fatal to the screen showing it.
pub async fn fetch_leaderboard(state: &SharedState, view: LeaderboardView) -> LeaderboardResponse {
    let config = state.config();
    let limit = match view {
        LeaderboardView::Landing => config.leaderboard.landing_count,
        LeaderboardView::Results => config.leaderboard.results_count,
    };

    let Some(store) = state.catalog_store().await else {
        warn!(?view, "leaderboard requested in degraded mode");
        return LeaderboardResponse::unavailable(view);
    };

    match store.top_scores(config.leaderboard.fetch_limit).await {
        Ok(rows) => {
            let entries = top_unique(rows, limit)
                .into_iter()
                .enumerate()
                .map(|(index, entry)| LeaderboardEntry::ranked(index + 1, entry))
                .collect();
            LeaderboardResponse {
                view,
                available: true,
                entries,
            }
        }
        Err(err) => {
            warn!(?view, error = %err, "failed to fetch leaderboard");
            LeaderboardResponse::unavailable(view)
        }
    }
}
