use std::sync::Arc;

use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    services::game_runner::GameHandle,
    state::{
        SseHub,
        screen_flow::{Screen, ScreenFlow},
    },
};

/// Capacity of each session's event channel; a tick per second plus feedback fits easily.
const SESSION_EVENTS_CAPACITY: usize = 32;

/// One player walking through the screens, with the game they are playing, if any.
pub struct PlayerSession {
    /// Identifier handed to the client.
    pub id: Uuid,
    /// Screen state machine.
    pub flow: ScreenFlow,
    /// Handle on the running (or finished) game of this session.
    pub game: Option<GameHandle>,
    /// Per-session SSE fan-out.
    pub events: Arc<SseHub>,
    last_activity: Instant,
}

impl PlayerSession {
    /// Fresh session on the landing screen.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            flow: ScreenFlow::new(),
            game: None,
            events: Arc::new(SseHub::new(SESSION_EVENTS_CAPACITY)),
            last_activity: Instant::now(),
        }
    }

    /// Record client activity.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the reaper may drop this session: idle long enough and not in a live game.
    pub fn is_reapable(&self, now: Instant, ttl: std::time::Duration) -> bool {
        let in_live_game = self.flow.screen() == Screen::Game && self.flow.load_error().is_none();
        !in_live_game && now.saturating_duration_since(self.last_activity) >= ttl
    }
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new()
    }
}
