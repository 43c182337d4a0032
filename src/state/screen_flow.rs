use thiserror::Error;

/// Screens a player walks through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Title view with the short leaderboard.
    Landing,
    /// Name capture.
    Username,
    /// Rules reminder before the countdown starts.
    Ready,
    /// A game session is loading or running.
    Game,
    /// Final score and the long leaderboard.
    Results,
}

/// Events that move the flow forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    /// "Play now" on the landing screen.
    PlayNow,
    /// Name submitted (already validated and trimmed).
    SubmitUsername(String),
    /// "Start now" on the ready screen.
    StartGame,
    /// The game loop reported its final score.
    GameEnded {
        /// Final score of the game.
        score: u32,
        /// Whether the score reached the leaderboard.
        saved: bool,
    },
    /// The game loop could not build a question sequence.
    GameLoadFailed(String),
    /// "Play again": back to the landing screen.
    Restart,
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            FlowEvent::PlayNow => "play_now",
            FlowEvent::SubmitUsername(_) => "submit_username",
            FlowEvent::StartGame => "start_game",
            FlowEvent::GameEnded { .. } => "game_ended",
            FlowEvent::GameLoadFailed(_) => "game_load_failed",
            FlowEvent::Restart => "restart",
        }
    }
}

/// Error returned when an event does not apply to the current screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid screen transition: {event} cannot be applied on {from:?}")]
pub struct FlowError {
    /// Screen the flow was on.
    pub from: Screen,
    /// Name of the rejected event.
    pub event: &'static str,
}

/// Linear screen state machine carrying the username and the final score forward.
#[derive(Debug, Clone)]
pub struct ScreenFlow {
    screen: Screen,
    version: usize,
    username: Option<String>,
    final_score: u32,
    score_saved: bool,
    load_error: Option<String>,
}

impl Default for ScreenFlow {
    fn default() -> Self {
        Self {
            screen: Screen::Landing,
            version: 0,
            username: None,
            final_score: 0,
            score_saved: false,
            load_error: None,
        }
    }
}

impl ScreenFlow {
    /// Create a flow on the landing screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Incremented on every transition.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Name captured on the username screen.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Score reported by the last game, zero until then.
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    /// Whether the last game's score was stored on the leaderboard.
    pub fn score_saved(&self) -> bool {
        self.score_saved
    }

    /// Why the current game could not start.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Apply an event, returning the new screen.
    pub fn apply(&mut self, event: FlowEvent) -> Result<Screen, FlowError> {
        let name = event.name();
        let next = match (self.screen, event) {
            (Screen::Landing, FlowEvent::PlayNow) => Screen::Username,
            (Screen::Username, FlowEvent::SubmitUsername(username)) => {
                self.username = Some(username);
                Screen::Ready
            }
            (Screen::Ready, FlowEvent::StartGame) if self.username.is_some() => {
                self.load_error = None;
                Screen::Game
            }
            (Screen::Game, FlowEvent::GameEnded { score, saved }) if self.load_error.is_none() => {
                self.final_score = score;
                self.score_saved = saved;
                Screen::Results
            }
            (Screen::Game, FlowEvent::GameLoadFailed(reason)) if self.load_error.is_none() => {
                self.load_error = Some(reason);
                Screen::Game
            }
            (Screen::Results, FlowEvent::Restart) => self.restart(),
            (Screen::Game, FlowEvent::Restart) if self.load_error.is_some() => self.restart(),
            (from, _) => return Err(FlowError { from, event: name }),
        };

        self.screen = next;
        self.version += 1;
        Ok(next)
    }

    fn restart(&mut self) -> Screen {
        self.final_score = 0;
        self.score_saved = false;
        self.load_error = None;
        Screen::Landing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_game() -> ScreenFlow {
        let mut flow = ScreenFlow::new();
        flow.apply(FlowEvent::PlayNow).unwrap();
        flow.apply(FlowEvent::SubmitUsername("ada".into())).unwrap();
        flow.apply(FlowEvent::StartGame).unwrap();
        flow
    }

    #[test]
    fn full_happy_path_carries_name_and_score() {
        let mut flow = ScreenFlow::new();
        assert_eq!(flow.screen(), Screen::Landing);
        assert_eq!(flow.apply(FlowEvent::PlayNow).unwrap(), Screen::Username);
        assert_eq!(
            flow.apply(FlowEvent::SubmitUsername("ada".into())).unwrap(),
            Screen::Ready
        );
        assert_eq!(flow.username(), Some("ada"));
        assert_eq!(flow.apply(FlowEvent::StartGame).unwrap(), Screen::Game);
        assert_eq!(
            flow.apply(FlowEvent::GameEnded {
                score: 7,
                saved: true
            })
            .unwrap(),
            Screen::Results
        );
        assert_eq!(flow.final_score(), 7);
        assert!(flow.score_saved());
        assert_eq!(flow.version(), 4);
    }

    #[test]
    fn restart_resets_score() {
        let mut flow = at_game();
        flow.apply(FlowEvent::GameEnded {
            score: 7,
            saved: true,
        })
        .unwrap();
        assert_eq!(flow.apply(FlowEvent::Restart).unwrap(), Screen::Landing);
        assert_eq!(flow.final_score(), 0);
        assert!(!flow.score_saved());
    }

    #[test]
    fn no_backward_transitions() {
        let mut flow = ScreenFlow::new();
        flow.apply(FlowEvent::PlayNow).unwrap();

        let err = flow.apply(FlowEvent::Restart).unwrap_err();
        assert_eq!(err.from, Screen::Username);
        assert_eq!(err.event, "restart");

        let err = flow.apply(FlowEvent::StartGame).unwrap_err();
        assert_eq!(err.from, Screen::Username);
    }

    #[test]
    fn game_cannot_be_restarted_while_running() {
        let mut flow = at_game();
        assert!(flow.apply(FlowEvent::Restart).is_err());
    }

    #[test]
    fn load_failure_keeps_game_screen_and_allows_restart() {
        let mut flow = at_game();
        flow.apply(FlowEvent::GameLoadFailed("catalog empty".into()))
            .unwrap();
        assert_eq!(flow.screen(), Screen::Game);
        assert_eq!(flow.load_error(), Some("catalog empty"));

        let ended = FlowEvent::GameEnded {
            score: 1,
            saved: false,
        };
        assert!(flow.apply(ended).is_err());
        assert_eq!(flow.apply(FlowEvent::Restart).unwrap(), Screen::Landing);
        assert_eq!(flow.load_error(), None);
    }
}
