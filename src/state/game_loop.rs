use std::time::Duration;

use thiserror::Error;

use crate::{config::GameConfig, state::game::ResolvedQuestion};

/// Phases of one game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Catalogs are being fetched and the question sequence built.
    Loading,
    /// Countdown running, waiting for an answer to the current question.
    Active,
    /// An answer was given; its correctness is shown until the dwell expires.
    Feedback,
    /// The final score is being appended to the leaderboard.
    Saving,
    /// Terminal: the final score has been reported.
    Ended,
    /// Terminal: the question sequence could not be built, the game never started.
    LoadFailed,
}

impl GamePhase {
    /// Whether no further event can change the session.
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Ended | GamePhase::LoadFailed)
    }
}

/// Named triggers consumed by [`GameLoop::apply`], one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The question builder produced the session's sequence.
    QuestionsLoaded(Vec<ResolvedQuestion>),
    /// The catalogs could not be fetched or yielded nothing playable.
    LoadFailed(String),
    /// One countdown period elapsed.
    Tick,
    /// The player picked an option.
    Select(String),
    /// The feedback dwell elapsed.
    DwellExpired,
    /// The leaderboard append finished, successfully or not.
    SaveCompleted {
        /// Whether the row was stored.
        saved: bool,
    },
}

impl GameEvent {
    fn name(&self) -> &'static str {
        match self {
            GameEvent::QuestionsLoaded(_) => "questions_loaded",
            GameEvent::LoadFailed(_) => "load_failed",
            GameEvent::Tick => "tick",
            GameEvent::Select(_) => "select",
            GameEvent::DwellExpired => "dwell_expired",
            GameEvent::SaveCompleted { .. } => "save_completed",
        }
    }
}

/// Side effects the driver of the loop must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEffect {
    /// Start the repeating countdown.
    StartCountdown,
    /// Stop the countdown; time no longer matters.
    StopCountdown,
    /// Deliver [`GameEvent::DwellExpired`] after the given delay.
    ScheduleDwell(Duration),
    /// Append the final score once, then deliver [`GameEvent::SaveCompleted`].
    PersistScore {
        /// Player name.
        username: String,
        /// Final score.
        score: u32,
    },
    /// Report the final score upward.
    Finished {
        /// Final score.
        score: u32,
        /// Whether the leaderboard append succeeded.
        saved: bool,
    },
    /// Report that the session could not start.
    LoadFailed(String),
}

/// Error returned when an event does not apply to the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the loop was in when the event was received.
    pub from: GamePhase,
    /// Name of the rejected event.
    pub event: &'static str,
}

/// Reasons an event was rejected. A rejected event never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    /// The event is not valid in the current phase.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Feedback for the current question is still showing.
    #[error("an answer is already pending for the current question")]
    SelectionPending,
    /// The chosen id is not one of the current question's options.
    #[error("option `{0}` is not offered by the current question")]
    UnknownOption(String),
}

/// Result of an accepted selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Option the player picked.
    pub option_id: String,
    /// Whether it was the correct logo.
    pub correct: bool,
    /// The correct logo of the question.
    pub correct_logo_id: String,
    /// Score after the answer.
    pub score: u32,
}

/// Read-only copy of the session state, published after each applied event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Current phase.
    pub phase: GamePhase,
    /// Incremented on every applied event.
    pub version: usize,
    /// Seconds left on the countdown.
    pub remaining_secs: u32,
    /// Cumulative score.
    pub score: u32,
    /// Index of the current question.
    pub question_index: usize,
    /// Length of the session's question sequence.
    pub total_questions: usize,
    /// Question being played, or the last one played once time is up.
    pub question: Option<ResolvedQuestion>,
    /// Option picked for [`GameSnapshot::question`], if any.
    pub selected: Option<String>,
    /// Whether the feedback overlay is visible.
    pub feedback_visible: bool,
    /// Correctness of the last selection.
    pub last_correct: bool,
    /// Outcome of the leaderboard append once known.
    pub saved: Option<bool>,
    /// Why loading failed, in [`GamePhase::LoadFailed`].
    pub load_error: Option<String>,
}

/// Game loop controller: timer, question index, score and feedback state of one session.
///
/// The controller is synchronous and owns no timers. It is driven by a single caller that feeds
/// [`GameEvent`]s in order and executes the returned [`GameEffect`]s.
#[derive(Debug, Clone)]
pub struct GameLoop {
    phase: GamePhase,
    version: usize,
    username: String,
    session_secs: u32,
    dwell: Duration,
    questions: Vec<ResolvedQuestion>,
    index: usize,
    remaining_secs: u32,
    score: u32,
    selected: Option<String>,
    feedback_visible: bool,
    last_correct: bool,
    save_requested: bool,
    saved: Option<bool>,
    load_error: Option<String>,
}

impl GameLoop {
    /// Create a controller in the loading phase for `username`.
    pub fn new(username: impl Into<String>, config: &GameConfig) -> Self {
        Self {
            phase: GamePhase::Loading,
            version: 0,
            username: username.into(),
            session_secs: config.session_secs,
            dwell: config.dwell,
            questions: Vec::new(),
            index: 0,
            remaining_secs: config.session_secs,
            score: 0,
            selected: None,
            feedback_visible: false,
            last_correct: false,
            save_requested: false,
            saved: None,
            load_error: None,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Cumulative score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Question currently being played.
    pub fn current_question(&self) -> Option<&ResolvedQuestion> {
        match self.phase {
            GamePhase::Active | GamePhase::Feedback => self.questions.get(self.index),
            _ => None,
        }
    }

    /// Question shown to the player. After the game it stays on the last one played.
    fn displayed_question(&self) -> Option<&ResolvedQuestion> {
        match self.phase {
            GamePhase::Loading | GamePhase::LoadFailed => None,
            _ => self.questions.get(self.index),
        }
    }

    /// Outcome of the selection whose feedback is showing.
    pub fn last_answer(&self) -> Option<AnswerOutcome> {
        if self.phase != GamePhase::Feedback {
            return None;
        }
        let question = self.questions.get(self.index)?;
        Some(AnswerOutcome {
            option_id: self.selected.clone()?,
            correct: self.last_correct,
            correct_logo_id: question.correct_logo_id.clone(),
            score: self.score,
        })
    }

    /// Copy the observable state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            version: self.version,
            remaining_secs: self.remaining_secs,
            score: self.score,
            question_index: self.index,
            total_questions: self.questions.len(),
            question: self.displayed_question().cloned(),
            selected: self.selected.clone(),
            feedback_visible: self.feedback_visible,
            last_correct: self.last_correct,
            saved: self.saved,
            load_error: self.load_error.clone(),
        }
    }

    /// Apply one event and return the effects the caller must execute.
    ///
    /// Ticks and dwell expiries that arrive after the phase they were armed for are stale: they
    /// are accepted and ignored so racing timers can never trigger a second save.
    pub fn apply(&mut self, event: GameEvent) -> Result<Vec<GameEffect>, LoopError> {
        let name = event.name();
        let effects = match (self.phase, event) {
            (GamePhase::Loading, GameEvent::QuestionsLoaded(questions)) => self.start(questions),
            (GamePhase::Loading, GameEvent::LoadFailed(reason)) => self.fail_load(reason),
            (GamePhase::Active | GamePhase::Feedback, GameEvent::Tick) => self.tick(),
            (GamePhase::Active, GameEvent::Select(option_id)) => self.select(option_id)?,
            (GamePhase::Feedback, GameEvent::Select(_)) => return Err(LoopError::SelectionPending),
            (GamePhase::Feedback, GameEvent::DwellExpired) => self.advance(),
            (GamePhase::Saving, GameEvent::SaveCompleted { saved }) => self.finish(saved),
            (phase, GameEvent::Tick | GameEvent::DwellExpired) if phase != GamePhase::Loading => {
                return Ok(Vec::new());
            }
            (from, _) => return Err(InvalidTransition { from, event: name }.into()),
        };

        self.version += 1;
        Ok(effects)
    }

    fn start(&mut self, questions: Vec<ResolvedQuestion>) -> Vec<GameEffect> {
        if questions.is_empty() {
            return self.fail_load("no playable questions".into());
        }

        self.questions = questions;
        self.index = 0;
        self.score = 0;
        self.remaining_secs = self.session_secs;
        self.phase = GamePhase::Active;
        vec![GameEffect::StartCountdown]
    }

    fn fail_load(&mut self, reason: String) -> Vec<GameEffect> {
        self.phase = GamePhase::LoadFailed;
        self.load_error = Some(reason.clone());
        vec![GameEffect::LoadFailed(reason)]
    }

    fn tick(&mut self) -> Vec<GameEffect> {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.enter_saving()
        } else {
            Vec::new()
        }
    }

    fn select(&mut self, option_id: String) -> Result<Vec<GameEffect>, LoopError> {
        let question = self
            .questions
            .get(self.index)
            .ok_or(LoopError::InvalidTransition(InvalidTransition {
                from: self.phase,
                event: "select",
            }))?;

        if !question.has_option(&option_id) {
            return Err(LoopError::UnknownOption(option_id));
        }

        let correct = option_id == question.correct_logo_id;
        if correct {
            self.score += 1;
        }
        self.last_correct = correct;
        self.selected = Some(option_id);
        self.feedback_visible = true;
        self.phase = GamePhase::Feedback;
        Ok(vec![GameEffect::ScheduleDwell(self.dwell)])
    }

    fn advance(&mut self) -> Vec<GameEffect> {
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.selected = None;
            self.feedback_visible = false;
            self.last_correct = false;
            self.phase = GamePhase::Active;
            Vec::new()
        } else {
            self.enter_saving()
        }
    }

    fn enter_saving(&mut self) -> Vec<GameEffect> {
        if self.save_requested {
            return Vec::new();
        }

        self.save_requested = true;
        self.feedback_visible = false;
        self.phase = GamePhase::Saving;
        vec![
            GameEffect::StopCountdown,
            GameEffect::PersistScore {
                username: self.username.clone(),
                score: self.score,
            },
        ]
    }

    fn finish(&mut self, saved: bool) -> Vec<GameEffect> {
        self.phase = GamePhase::Ended;
        self.saved = Some(saved);
        vec![GameEffect::Finished {
            score: self.score,
            saved,
        }]
    }
}
