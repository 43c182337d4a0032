use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::dao::models::{
    LeaderboardEntryEntity, LogoEntity, NewLeaderboardEntry, QuestionEntity, QuestionKind,
};

use super::error::PostgrestError;

pub const LOGOS_TABLE: &str = "logos";
pub const QUESTIONS_TABLE: &str = "questions";
pub const LEADERBOARD_TABLE: &str = "leaderboard";

pub const LOGO_COLUMNS: &str = "id,name,image_url";
pub const QUESTION_COLUMNS: &str = "id,question_type,correct_logo_id,option_ids";
pub const LEADERBOARD_COLUMNS: &str = "username,score,created_at";

/// Primary and foreign keys may be serial integers or uuids depending on the table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoRow {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<LogoRow> for LogoEntity {
    fn from(row: LogoRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            image_url: row.image_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionRow {
    pub id: RawId,
    pub question_type: String,
    pub correct_logo_id: RawId,
    #[serde(default)]
    pub option_ids: Option<Vec<RawId>>,
}

impl TryFrom<QuestionRow> for QuestionEntity {
    type Error = PostgrestError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let kind = match row.question_type.as_str() {
            "text_options" => QuestionKind::NameGuess,
            "image_options" => QuestionKind::ImageGuess,
            other => {
                return Err(PostgrestError::InvalidRow {
                    table: QUESTIONS_TABLE.into(),
                    reason: format!("unknown question_type `{other}`"),
                });
            }
        };

        Ok(Self {
            id: row.id.into(),
            kind,
            correct_logo_id: row.correct_logo_id.into(),
            option_ids: row
                .option_ids
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardRow {
    pub username: String,
    pub score: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<LeaderboardRow> for LeaderboardEntryEntity {
    type Error = PostgrestError;

    fn try_from(row: LeaderboardRow) -> Result<Self, Self::Error> {
        let score = u32::try_from(row.score).map_err(|_| PostgrestError::InvalidRow {
            table: LEADERBOARD_TABLE.into(),
            reason: format!("score {} out of range", row.score),
        })?;

        Ok(Self {
            username: row.username,
            score,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardInsert<'a> {
    pub username: &'a str,
    pub score: u32,
}

impl<'a> From<&'a NewLeaderboardEntry> for LeaderboardInsert<'a> {
    fn from(entry: &'a NewLeaderboardEntry) -> Self {
        Self {
            username: &entry.username,
            score: entry.score,
        }
    }
}
