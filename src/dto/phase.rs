use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{game_loop::GamePhase, screen_flow::Screen};

/// Screen exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleScreen {
    /// Title and short leaderboard.
    Landing,
    /// Name capture.
    Username,
    /// Rules reminder.
    Ready,
    /// Game loading or running.
    Game,
    /// Final score and long leaderboard.
    Results,
}

impl From<Screen> for VisibleScreen {
    fn from(value: Screen) -> Self {
        match value {
            Screen::Landing => VisibleScreen::Landing,
            Screen::Username => VisibleScreen::Username,
            Screen::Ready => VisibleScreen::Ready,
            Screen::Game => VisibleScreen::Game,
            Screen::Results => VisibleScreen::Results,
        }
    }
}

/// Game loop phase exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    /// Questions are being loaded.
    Loading,
    /// Waiting for an answer.
    Active,
    /// Showing the correctness of the last answer.
    Feedback,
    /// Storing the final score.
    Saving,
    /// Game over.
    Ended,
    /// The game could not start.
    LoadFailed,
}

impl From<GamePhase> for VisibleGamePhase {
    fn from(value: GamePhase) -> Self {
        match value {
            GamePhase::Loading => VisibleGamePhase::Loading,
            GamePhase::Active => VisibleGamePhase::Active,
            GamePhase::Feedback => VisibleGamePhase::Feedback,
            GamePhase::Saving => VisibleGamePhase::Saving,
            GamePhase::Ended => VisibleGamePhase::Ended,
            GamePhase::LoadFailed => VisibleGamePhase::LoadFailed,
        }
    }
}
