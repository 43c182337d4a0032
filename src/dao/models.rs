use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Logo catalog row: the reference data every question points into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoEntity {
    /// Unique key of the logo.
    pub id: String,
    /// Display name of the brand (e.g. "GitHub").
    pub name: String,
    /// Opaque URI of the logo image, resolved by an external content host.
    pub image_url: String,
}

/// Presentation mode of a question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    /// Show the logo image, pick the matching name (`text_options`).
    #[serde(rename = "text_options")]
    NameGuess,
    /// Show the candidates as images, pick the real logo (`image_options`).
    #[serde(rename = "image_options")]
    ImageGuess,
}

/// Question catalog row referencing logos by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Unique key of the question.
    pub id: String,
    /// How the question is presented.
    #[serde(rename = "question_type")]
    pub kind: QuestionKind,
    /// Logo that answers the question.
    pub correct_logo_id: String,
    /// Candidate logos offered to the player, correct one included.
    pub option_ids: Vec<String>,
}

/// Persisted leaderboard row. Rows are append-only: one per completed game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntryEntity {
    /// Name entered by the player.
    pub username: String,
    /// Final score of the game.
    pub score: u32,
    /// Server-assigned creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Row appended to the leaderboard when a game ends; the server assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewLeaderboardEntry {
    /// Name entered by the player.
    pub username: String,
    /// Final score of the game.
    pub score: u32,
}
