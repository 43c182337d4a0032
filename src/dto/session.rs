use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{leaderboard::LeaderboardResponse, phase::VisibleScreen, validation::validate_username},
    state::screen_flow::ScreenFlow,
};

/// Screen-level view of a player session.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub screen: VisibleScreen,
    /// Incremented on every screen transition.
    pub version: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Score of the last finished game, zero before that.
    pub final_score: u32,
    /// Set while the game screen shows a load failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl SessionSnapshot {
    /// Describe `flow` for session `id`.
    pub fn from_flow(id: Uuid, flow: &ScreenFlow) -> Self {
        Self {
            id,
            screen: flow.screen().into(),
            version: flow.version(),
            username: flow.username().map(str::to_owned),
            final_score: flow.final_score(),
            load_error: flow.load_error().map(str::to_owned),
        }
    }
}

/// Payload of `PUT /sessions/{id}/username`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UsernameRequest {
    /// Surrounding whitespace is trimmed before use.
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

/// Payload of `POST /sessions/{id}/answer`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AnswerRequest {
    /// Id of the picked option.
    #[validate(length(min = 1))]
    pub option_id: String,
}

/// Results screen: final score and the long leaderboard.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ResultsResponse {
    pub username: String,
    pub score: u32,
    /// Whether the score reached the leaderboard.
    pub saved: bool,
    pub leaderboard: LeaderboardResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::screen_flow::FlowEvent;

    #[test]
    fn snapshot_reflects_flow() {
        let mut flow = ScreenFlow::new();
        flow.apply(FlowEvent::PlayNow).unwrap();
        flow.apply(FlowEvent::SubmitUsername("ada".into())).unwrap();

        let id = Uuid::new_v4();
        let snapshot = SessionSnapshot::from_flow(id, &flow);
        assert_eq!(snapshot.screen, VisibleScreen::Ready);
        assert_eq!(snapshot.username.as_deref(), Some("ada"));
        assert_eq!(snapshot.version, 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["screen"], "ready");
        assert!(json.get("load_error").is_none());
    }

    #[test]
    fn username_request_validation() {
        let ok = UsernameRequest {
            username: " ada ".into(),
        };
        assert!(ok.validate().is_ok());

        let blank = UsernameRequest {
            username: "  ".into(),
        };
        assert!(blank.validate().is_err());
    }
}
