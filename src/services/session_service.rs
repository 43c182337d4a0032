//! Player-session operations: screen transitions, game start, answers and results.

use tokio::{
    sync::{broadcast, watch},
    time::{Instant, interval},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        game::{AnswerResponse, GameStateResponse},
        leaderboard::LeaderboardView,
        session::{ResultsResponse, SessionSnapshot},
        sse::ServerEvent,
    },
    error::ServiceError,
    services::{
        game_runner::{GameHandle, GameRunner},
        leaderboard_service, sse_events,
    },
    state::{
        SharedState,
        game_loop::GameSnapshot,
        screen_flow::{FlowEvent, Screen},
        session::PlayerSession,
    },
};

/// Create a session on the landing screen.
pub fn create_session(state: &SharedState) -> SessionSnapshot {
    let session = PlayerSession::new();
    let snapshot = SessionSnapshot::from_flow(session.id, &session.flow);
    info!(session_id = %session.id, "session created");
    state.sessions().insert(session.id, session);
    snapshot
}

/// Screen-flow snapshot of a session.
pub fn get_session(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    with_session(state, id, |session| {
        Ok(SessionSnapshot::from_flow(session.id, &session.flow))
    })
}

/// Drop a session. A running game stops without saving.
pub fn delete_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    match state.sessions().remove(&id) {
        Some(_) => {
            info!(session_id = %id, "session deleted");
            Ok(())
        }
        None => Err(session_not_found(id)),
    }
}

/// Landing → Username.
pub fn play_now(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    with_session(state, id, |session| advance(session, FlowEvent::PlayNow))
}

/// Username → Ready, storing the trimmed name.
pub fn submit_username(
    state: &SharedState,
    id: Uuid,
    username: &str,
) -> Result<SessionSnapshot, ServiceError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ServiceError::InvalidInput("username must not be blank".into()));
    }

    with_session(state, id, |session| {
        advance(session, FlowEvent::SubmitUsername(username.to_string()))
    })
}

/// Ready → Game, starting a fresh game loop for the session.
pub fn start_game(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let (snapshot, runner) = with_session(state, id, |session| {
        let snapshot = advance(session, FlowEvent::StartGame)?;
        let username = session.flow.username().unwrap_or_default().to_string();
        let (handle, runner) =
            GameRunner::new(state.clone(), session.id, username, session.events.clone());
        session.game = Some(handle);
        Ok((snapshot, runner))
    })?;

    info!(session_id = %id, "game started");
    runner.spawn();
    Ok(snapshot)
}

/// Client view of the session's game.
pub fn game_state(state: &SharedState, id: Uuid) -> Result<GameStateResponse, ServiceError> {
    let snapshot = game_handle(state, id)?.snapshot();
    Ok(GameStateResponse::from_snapshot(
        &snapshot,
        &state.config().images,
    ))
}

/// Follow the raw game snapshots of a session.
pub fn watch_game(
    state: &SharedState,
    id: Uuid,
) -> Result<watch::Receiver<GameSnapshot>, ServiceError> {
    Ok(game_handle(state, id)?.subscribe())
}

/// Submit an answer for the current question.
pub async fn submit_answer(
    state: &SharedState,
    id: Uuid,
    option_id: String,
) -> Result<AnswerResponse, ServiceError> {
    let handle = game_handle(state, id)?;
    let outcome = handle.select(option_id).await?;
    debug!(session_id = %id, correct = outcome.correct, score = outcome.score, "answer recorded");
    Ok(outcome.into())
}

/// Final score with the results leaderboard, the player's row highlighted.
pub async fn results(state: &SharedState, id: Uuid) -> Result<ResultsResponse, ServiceError> {
    let (username, score, saved) = with_session(state, id, |session| {
        if session.flow.screen() != Screen::Results {
            return Err(ServiceError::InvalidState(
                "results are only available once the game is over".into(),
            ));
        }
        Ok((
            session.flow.username().unwrap_or_default().to_string(),
            session.flow.final_score(),
            session.flow.score_saved(),
        ))
    })?;

    let mut leaderboard = leaderboard_service::fetch_leaderboard(state, LeaderboardView::Results).await;
    leaderboard.highlight(&username, score);

    Ok(ResultsResponse {
        username,
        score,
        saved,
        leaderboard,
    })
}

/// Back to the landing screen, keeping the username and clearing the score.
pub fn restart(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    with_session(state, id, |session| {
        let snapshot = advance(session, FlowEvent::Restart)?;
        session.game = None;
        Ok(snapshot)
    })
}

/// Subscribe to the session's SSE hub, announcing the current screen to it.
pub fn subscribe_events(
    state: &SharedState,
    id: Uuid,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    with_session(state, id, |session| {
        let receiver = session.events.subscribe();
        let snapshot = SessionSnapshot::from_flow(session.id, &session.flow);
        sse_events::broadcast_screen_changed(&session.events, &snapshot);
        Ok(receiver)
    })
}

/// Report the final score of a game, and whether it was stored, to the screen flow.
pub(crate) fn complete_game(state: &SharedState, id: Uuid, score: u32, saved: bool) {
    apply_game_outcome(state, id, FlowEvent::GameEnded { score, saved });
}

/// Report that a game could not load its questions.
pub(crate) fn fail_game(state: &SharedState, id: Uuid, reason: String) {
    apply_game_outcome(state, id, FlowEvent::GameLoadFailed(reason));
}

fn apply_game_outcome(state: &SharedState, id: Uuid, event: FlowEvent) {
    let Some(mut session) = state.sessions().get_mut(&id) else {
        debug!(session_id = %id, "game outcome for a dropped session");
        return;
    };
    if let Err(err) = advance(session.value_mut(), event) {
        warn!(session_id = %id, error = %err, "game outcome ignored by screen flow");
    }
}

/// Drop sessions idle for at least `ttl` that are not in a live game.
pub fn reap_idle_sessions(state: &SharedState, ttl: std::time::Duration) -> usize {
    let now = Instant::now();
    let before = state.sessions().len();
    state
        .sessions()
        .retain(|_, session| !session.is_reapable(now, ttl));
    before.saturating_sub(state.sessions().len())
}

/// Periodically reap idle sessions using the configured time-to-live.
pub async fn run_session_reaper(state: SharedState) {
    let ttl = state.config().session_idle_ttl;
    let mut ticker = interval(ttl / 4);
    loop {
        ticker.tick().await;
        let reaped = reap_idle_sessions(&state, ttl);
        if reaped > 0 {
            info!(reaped, "reaped idle sessions");
        }
    }
}

fn game_handle(state: &SharedState, id: Uuid) -> Result<GameHandle, ServiceError> {
    with_session(state, id, |session| {
        session
            .game
            .clone()
            .ok_or_else(|| ServiceError::InvalidState("no game has been started".into()))
    })
}

/// Run `f` on a session under its map lock, recording the activity.
fn with_session<T>(
    state: &SharedState,
    id: Uuid,
    f: impl FnOnce(&mut PlayerSession) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let mut session = state
        .sessions()
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))?;
    session.touch();
    f(session.value_mut())
}

fn advance(session: &mut PlayerSession, event: FlowEvent) -> Result<SessionSnapshot, ServiceError> {
    session.flow.apply(event)?;
    let snapshot = SessionSnapshot::from_flow(session.id, &session.flow);
    sse_events::broadcast_screen_changed(&session.events, &snapshot);
    Ok(snapshot)
}

fn session_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("session `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    #[test]
    fn walks_to_ready_and_trims_username() {
        let state = AppState::new(AppConfig::default());
        let id = create_session(&state).id;

        play_now(&state, id).unwrap();
        let snapshot = submit_username(&state, id, "  ada  ").unwrap();
        assert_eq!(snapshot.username.as_deref(), Some("ada"));
        assert_eq!(snapshot.version, 2);
    }

    #[test]
    fn wrong_screen_is_invalid_state() {
        let state = AppState::new(AppConfig::default());
        let id = create_session(&state).id;

        let err = submit_username(&state, id, "ada").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        let err = restart(&state, id).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[test]
    fn unknown_session_is_not_found() {
        let state = AppState::new(AppConfig::default());
        let err = play_now(&state, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(delete_session(&state, Uuid::new_v4()).is_err());
    }

    #[test]
    fn game_state_requires_a_started_game() {
        let state = AppState::new(AppConfig::default());
        let id = create_session(&state).id;
        assert!(matches!(
            game_state(&state, id),
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_drops_idle_sessions_only() {
        let state = AppState::new(AppConfig::default());
        let idle = create_session(&state).id;
        tokio::time::advance(Duration::from_secs(120)).await;
        let fresh = create_session(&state).id;

        let reaped = reap_idle_sessions(&state, Duration::from_secs(60));
        assert_eq!(reaped, 1);
        assert!(get_session(&state, idle).is_err());
        assert!(get_session(&state, fresh).is_ok());
    }

    #[tokio::test]
    async fn results_report_the_saved_flag_carried_by_the_flow() {
        let state = AppState::new(AppConfig::default());
        let id = create_session(&state).id;
        play_now(&state, id).unwrap();
        submit_username(&state, id, "ada").unwrap();
        state
            .sessions()
            .get_mut(&id)
            .unwrap()
            .flow
            .apply(FlowEvent::StartGame)
            .unwrap();

        complete_game(&state, id, 4, true);

        let report = results(&state, id).await.unwrap();
        assert_eq!(report.username, "ada");
        assert_eq!(report.score, 4);
        assert!(report.saved);
        assert!(!report.leaderboard.available);
    }

    #[tokio::test]
    async fn session_events_announce_screen_changes() {
        let state = AppState::new(AppConfig::default());
        let id = create_session(&state).id;
        let mut events = subscribe_events(&state, id).unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.event.as_deref(), Some("screen.changed"));

        play_now(&state, id).unwrap();
        let changed = events.recv().await.unwrap();
        let payload: serde_json::Value = serde_json::from_str(&changed.data).unwrap();
        assert_eq!(payload["screen"], "username");
    }
}
