use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{dao::models::LeaderboardEntryEntity, dto::format_timestamp};

/// Which screen the leaderboard is rendered on; decides how many players are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardView {
    /// Short list on the landing screen.
    #[default]
    Landing,
    /// Long list on the results screen.
    Results,
}

/// Query string of `GET /leaderboard`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Target view, `landing` when omitted.
    #[serde(default)]
    pub view: LeaderboardView,
}

/// One player's best score.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: usize,
    pub username: String,
    pub score: u32,
    /// RFC 3339 timestamp of the stored row.
    pub created_at: String,
    /// Set on the results screen for the row matching the player's game.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_current_player: bool,
}

impl LeaderboardEntry {
    /// Build the entry displayed at `rank`.
    pub fn ranked(rank: usize, entity: LeaderboardEntryEntity) -> Self {
        Self {
            rank,
            username: entity.username,
            score: entity.score,
            created_at: format_timestamp(entity.created_at),
            is_current_player: false,
        }
    }
}

/// Deduplicated, truncated leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub view: LeaderboardView,
    /// `false` when the data source could not be queried; `entries` is then empty.
    pub available: bool,
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardResponse {
    /// Empty board used when the leaderboard could not be fetched.
    pub fn unavailable(view: LeaderboardView) -> Self {
        Self {
            view,
            available: false,
            entries: Vec::new(),
        }
    }

    /// Flag the first entry matching the player's name and final score.
    pub fn highlight(&mut self, username: &str, score: u32) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.username == username && entry.score == score)
        {
            entry.is_current_player = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn entry(rank: usize, username: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry::ranked(
            rank,
            LeaderboardEntryEntity {
                username: username.into(),
                score,
                created_at: OffsetDateTime::UNIX_EPOCH,
            },
        )
    }

    #[test]
    fn ranked_formats_timestamp() {
        let entry = entry(1, "ada", 4);
        assert_eq!(entry.created_at, "1970-01-01T00:00:00Z");
        assert!(!entry.is_current_player);
    }

    #[test]
    fn highlight_marks_only_matching_row() {
        let mut board = LeaderboardResponse {
            view: LeaderboardView::Results,
            available: true,
            entries: vec![entry(1, "bob", 9), entry(2, "ada", 5)],
        };
        board.highlight("ada", 5);
        assert!(!board.entries[0].is_current_player);
        assert!(board.entries[1].is_current_player);

        let json = serde_json::to_value(&board).unwrap();
        assert!(json["entries"][0].get("is_current_player").is_none());
        assert_eq!(json["entries"][1]["is_current_player"], true);
        assert_eq!(json["view"], "results");
    }

    #[test]
    fn highlight_ignores_a_better_older_score() {
        let mut board = LeaderboardResponse {
            view: LeaderboardView::Results,
            available: true,
            entries: vec![entry(1, "ada", 9)],
        };
        board.highlight("ada", 3);
        assert!(!board.entries[0].is_current_player);
    }
}
