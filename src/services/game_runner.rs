//! Per-session task driving the [`GameLoop`] controller.
//!
//! The task is the only owner of the controller. Timers, answer submissions and the outcome of
//! the leaderboard append are all turned into [`GameEvent`]s and applied one at a time, and the
//! resulting snapshot is published on a `watch` channel and on the session's SSE hub.

use std::{future::pending, pin::Pin, sync::Arc};

use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{Instant, Interval, MissedTickBehavior, Sleep, interval_at, sleep},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::NewLeaderboardEntry,
    dto::game::{AnswerResponse, GameStateResponse},
    error::ServiceError,
    services::{question_builder::load_questions, session_service, sse_events},
    state::{
        SharedState, SseHub,
        game_loop::{AnswerOutcome, GameEffect, GameEvent, GameLoop, GameSnapshot, LoopError},
    },
};

/// An answer submitted by the player, with the channel the outcome is sent back on.
pub struct SelectRequest {
    option_id: String,
    reply: oneshot::Sender<Result<Option<AnswerOutcome>, LoopError>>,
}

/// Cloneable handle on a running game: submit answers and observe snapshots.
///
/// Dropping every handle closes the command channel, which stops the game without saving.
#[derive(Clone)]
pub struct GameHandle {
    commands: mpsc::UnboundedSender<SelectRequest>,
    snapshot: watch::Receiver<GameSnapshot>,
}

impl GameHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Follow snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot.clone()
    }

    /// Submit an answer and wait for the controller's verdict.
    pub async fn select(&self, option_id: String) -> Result<AnswerOutcome, ServiceError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(SelectRequest { option_id, reply })
            .map_err(|_| ServiceError::InvalidState("the game is no longer running".into()))?;

        let outcome = outcome
            .await
            .map_err(|_| ServiceError::InvalidState("the game is no longer running".into()))??;
        outcome.ok_or_else(|| ServiceError::InvalidState("the answer was not recorded".into()))
    }
}

/// Timers armed by the controller's effects. An empty slot never fires.
#[derive(Default)]
struct Timers {
    countdown: Option<Interval>,
    dwell: Option<Pin<Box<Sleep>>>,
    save: Option<oneshot::Receiver<bool>>,
}

async fn next_tick(countdown: &mut Option<Interval>) {
    match countdown.as_mut() {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn dwell_expired(dwell: &mut Option<Pin<Box<Sleep>>>) {
    match dwell.as_mut() {
        Some(timer) => {
            timer.as_mut().await;
            *dwell = None;
        }
        None => pending().await,
    }
}

async fn save_completed(save: &mut Option<oneshot::Receiver<bool>>) -> bool {
    match save.as_mut() {
        Some(receiver) => {
            // A dropped sender means the append task died; treat it as a failed save.
            let saved = receiver.await.unwrap_or(false);
            *save = None;
            saved
        }
        None => pending().await,
    }
}

enum Next {
    Event(GameEvent),
    Select(SelectRequest),
    Abandoned,
}

/// Owner of one session's [`GameLoop`].
pub struct GameRunner {
    state: SharedState,
    session_id: Uuid,
    events: Arc<SseHub>,
    game: GameLoop,
    commands: mpsc::UnboundedReceiver<SelectRequest>,
    snapshot: watch::Sender<GameSnapshot>,
    timers: Timers,
}

impl GameRunner {
    /// Create the runner of a new game for `username` along with its handle.
    ///
    /// Nothing happens until [`GameRunner::run`] is polled.
    pub fn new(
        state: SharedState,
        session_id: Uuid,
        username: String,
        events: Arc<SseHub>,
    ) -> (GameHandle, Self) {
        let game = GameLoop::new(username, &state.config().game);
        let (snapshot_tx, snapshot_rx) = watch::channel(game.snapshot());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let handle = GameHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
        };
        let runner = Self {
            state,
            session_id,
            events,
            game,
            commands: commands_rx,
            snapshot: snapshot_tx,
            timers: Timers::default(),
        };
        (handle, runner)
    }

    /// Spawn [`GameRunner::run`] on the Tokio runtime.
    pub fn spawn(self) {
        tokio::spawn(self.run());
    }

    /// Load the questions, then process events until the game reaches a terminal phase.
    pub async fn run(mut self) {
        let session_id = self.session_id;
        let loaded = self.load().await;
        let _ = self.dispatch(loaded);

        while !self.game.phase().is_terminal() {
            // Order matters: a dwell expiring on the same instant as the final tick advances
            // first, and a finished save is consumed before any further command.
            let next = tokio::select! {
                biased;
                () = dwell_expired(&mut self.timers.dwell) => Next::Event(GameEvent::DwellExpired),
                saved = save_completed(&mut self.timers.save) => {
                    Next::Event(GameEvent::SaveCompleted { saved })
                }
                request = self.commands.recv() => match request {
                    Some(request) => Next::Select(request),
                    None => Next::Abandoned,
                },
                () = next_tick(&mut self.timers.countdown) => Next::Event(GameEvent::Tick),
            };

            match next {
                Next::Event(event) => {
                    let _ = self.dispatch(event);
                }
                Next::Select(SelectRequest { option_id, reply }) => {
                    let result = self
                        .dispatch(GameEvent::Select(option_id))
                        .map(|()| self.game.last_answer());
                    if let Ok(Some(outcome)) = &result {
                        sse_events::broadcast_feedback(
                            &self.events,
                            &AnswerResponse::from(outcome.clone()),
                        );
                    }
                    let _ = reply.send(result);
                }
                Next::Abandoned => {
                    info!(%session_id, phase = ?self.game.phase(), "session closed; stopping game");
                    return;
                }
            }
        }

        debug!(%session_id, phase = ?self.game.phase(), "game task finished");
    }

    async fn load(&self) -> GameEvent {
        let Some(store) = self.state.catalog_store().await else {
            warn!(session_id = %self.session_id, "cannot load questions in degraded mode");
            return GameEvent::LoadFailed("the data source is unavailable".into());
        };

        let fallback = &self.state.config().images.fallback_url;
        match load_questions(store.as_ref(), fallback).await {
            Ok(questions) => {
                info!(
                    session_id = %self.session_id,
                    questions = questions.len(),
                    "question sequence ready"
                );
                GameEvent::QuestionsLoaded(questions)
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "failed to load questions");
                GameEvent::LoadFailed(err.to_string())
            }
        }
    }

    /// Apply one event, execute its effects, then publish the new snapshot.
    fn dispatch(&mut self, event: GameEvent) -> Result<(), LoopError> {
        let version = self.game.snapshot().version;
        let effects = match self.game.apply(event) {
            Ok(effects) => effects,
            Err(err) => {
                debug!(session_id = %self.session_id, error = %err, "game event rejected");
                return Err(err);
            }
        };

        for effect in effects {
            self.execute(effect);
        }

        let snapshot = self.game.snapshot();
        if snapshot.version != version {
            let view = GameStateResponse::from_snapshot(&snapshot, &self.state.config().images);
            sse_events::broadcast_game_state(&self.events, &view);
            self.snapshot.send_replace(snapshot);
        }
        Ok(())
    }

    fn execute(&mut self, effect: GameEffect) {
        match effect {
            GameEffect::StartCountdown => {
                let period = self.state.config().game.tick;
                let mut countdown = interval_at(Instant::now() + period, period);
                countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.timers.countdown = Some(countdown);
            }
            GameEffect::StopCountdown => {
                self.timers.countdown = None;
            }
            GameEffect::ScheduleDwell(delay) => {
                self.timers.dwell = Some(Box::pin(sleep(delay)));
            }
            GameEffect::PersistScore { username, score } => {
                self.timers.save = Some(self.persist(username, score));
            }
            GameEffect::Finished { score, saved } => {
                info!(session_id = %self.session_id, score, saved, "game over");
                sse_events::broadcast_game_over(&self.events, score, saved);
                session_service::complete_game(&self.state, self.session_id, score, saved);
            }
            GameEffect::LoadFailed(reason) => {
                sse_events::broadcast_load_failed(&self.events, &reason);
                session_service::fail_game(&self.state, self.session_id, reason);
            }
        }
    }

    /// Append the final score in the background; the receiver yields whether it was stored.
    fn persist(&self, username: String, score: u32) -> oneshot::Receiver<bool> {
        let (done, completion) = oneshot::channel();
        let state = self.state.clone();
        let session_id = self.session_id;

        tokio::spawn(async move {
            let saved = match state.catalog_store().await {
                Some(store) => {
                    let entry = NewLeaderboardEntry {
                        username: username.clone(),
                        score,
                    };
                    match store.append_score(entry).await {
                        Ok(()) => {
                            info!(%session_id, score, "score saved to leaderboard");
                            sse_events::broadcast_leaderboard_updated(
                                state.public_sse(),
                                &username,
                                score,
                            );
                            true
                        }
                        Err(err) => {
                            error!(%session_id, score, error = %err, "failed to save score");
                            false
                        }
                    }
                }
                None => {
                    warn!(%session_id, score, "score not saved: data source unavailable");
                    false
                }
            };
            let _ = done.send(saved);
        });

        completion
    }
}
