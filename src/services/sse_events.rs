use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::{AnswerResponse, GameStateResponse},
        session::SessionSnapshot,
        sse::{GameOverEvent, LeaderboardUpdatedEvent, LoadFailedEvent, ServerEvent, SystemStatus},
    },
    state::SseHub,
};

const EVENT_SCREEN_CHANGED: &str = "screen.changed";
const EVENT_GAME_STATE: &str = "game.state";
const EVENT_GAME_FEEDBACK: &str = "game.feedback";
const EVENT_GAME_OVER: &str = "game.over";
const EVENT_GAME_LOAD_FAILED: &str = "game.load_failed";
const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard.updated";
const EVENT_SYSTEM_STATUS: &str = "system_status";

/// Broadcast the screen-flow snapshot of a session.
pub fn broadcast_screen_changed(hub: &SseHub, snapshot: &SessionSnapshot) {
    send_event(hub, EVENT_SCREEN_CHANGED, snapshot);
}

/// Broadcast the game state after an applied event, ticks included.
pub fn broadcast_game_state(hub: &SseHub, state: &GameStateResponse) {
    send_event(hub, EVENT_GAME_STATE, state);
}

/// Broadcast the correctness of an accepted selection.
pub fn broadcast_feedback(hub: &SseHub, answer: &AnswerResponse) {
    send_event(hub, EVENT_GAME_FEEDBACK, answer);
}

/// Broadcast the final score of a session.
pub fn broadcast_game_over(hub: &SseHub, score: u32, saved: bool) {
    send_event(hub, EVENT_GAME_OVER, &GameOverEvent { score, saved });
}

/// Broadcast that the question sequence could not be built.
pub fn broadcast_load_failed(hub: &SseHub, reason: &str) {
    let payload = LoadFailedEvent {
        reason: reason.to_string(),
    };
    send_event(hub, EVENT_GAME_LOAD_FAILED, &payload);
}

/// Tell public subscribers that the leaderboard gained a row.
pub fn broadcast_leaderboard_updated(hub: &SseHub, username: &str, score: u32) {
    let payload = LeaderboardUpdatedEvent {
        username: username.to_string(),
        score,
    };
    send_event(hub, EVENT_LEADERBOARD_UPDATED, &payload);
}

/// Broadcast the degraded flag to public subscribers.
pub fn broadcast_system_status(hub: &SseHub, degraded: bool) {
    send_event(hub, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_event<T: Serialize>(hub: &SseHub, event: &str, payload: &T) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(message) => hub.broadcast(message),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_their_name_and_json_payload() {
        let hub = SseHub::new(4);
        let mut receiver = hub.subscribe();

        broadcast_game_over(&hub, 7, false);

        let event = receiver.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("game.over"));
        let payload: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["score"], 7);
        assert_eq!(payload["saved"], false);
    }

    #[test]
    fn broadcasting_without_subscribers_is_harmless() {
        let hub = SseHub::new(4);
        broadcast_load_failed(&hub, "catalog empty");
        broadcast_system_status(&hub, true);
    }
}
