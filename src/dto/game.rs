use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::ImageConfig,
    dao::models::QuestionKind,
    dto::phase::VisibleGamePhase,
    services::image::optimize_image,
    state::{
        game::ResolvedQuestion,
        game_loop::{AnswerOutcome, GamePhase, GameSnapshot},
    },
};

/// Presentation mode of a question as sent to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKindDto {
    /// One logo image, pick its name.
    TextOptions,
    /// One prompt, pick the matching image.
    ImageOptions,
}

impl From<QuestionKind> for QuestionKindDto {
    fn from(value: QuestionKind) -> Self {
        match value {
            QuestionKind::NameGuess => QuestionKindDto::TextOptions,
            QuestionKind::ImageGuess => QuestionKindDto::ImageOptions,
        }
    }
}

/// Answer candidate. Name-guess questions carry names, image-guess questions carry images.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The question being played, without its answer.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub id: String,
    pub kind: QuestionKindDto,
    /// Logo to identify, only on name-guess questions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_image: Option<String>,
    pub options: Vec<OptionView>,
}

impl QuestionView {
    /// Project a resolved question, requesting resized images from the content host.
    pub fn from_question(question: &ResolvedQuestion, images: &ImageConfig) -> Self {
        let options = question
            .options
            .iter()
            .map(|option| match question.kind {
                QuestionKind::NameGuess => OptionView {
                    id: option.id.clone(),
                    name: Some(option.name.clone()),
                    image: None,
                },
                QuestionKind::ImageGuess => OptionView {
                    id: option.id.clone(),
                    name: None,
                    image: Some(optimize_image(
                        &option.image_url,
                        images.option_width,
                        images.quality,
                    )),
                },
            })
            .collect();

        let display_image = match question.kind {
            QuestionKind::NameGuess => Some(optimize_image(
                &question.display_image,
                images.logo_width,
                images.quality,
            )),
            QuestionKind::ImageGuess => None,
        };

        Self {
            id: question.id.clone(),
            kind: question.kind.into(),
            display_image,
            options,
        }
    }
}

/// Correctness of the selection whose feedback is showing, or of the last question once the
/// game is over.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct FeedbackView {
    /// Absent when time ran out before the last question was answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub correct: bool,
    pub correct_logo_id: String,
}

/// Observable game state served by `GET /sessions/{id}/game` and pushed as `game.state`.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct GameStateResponse {
    pub phase: VisibleGamePhase,
    /// Incremented on every applied game event.
    pub version: usize,
    pub remaining_secs: u32,
    pub score: u32,
    pub question_index: usize,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackView>,
    /// Whether the final score reached the leaderboard, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    /// Image to show when a logo fails to load.
    pub fallback_image: String,
}

impl GameStateResponse {
    /// Build the client view of a snapshot.
    pub fn from_snapshot(snapshot: &GameSnapshot, images: &ImageConfig) -> Self {
        let game_over = matches!(snapshot.phase, GamePhase::Saving | GamePhase::Ended);
        let feedback = snapshot
            .question
            .as_ref()
            .filter(|_| game_over || (snapshot.feedback_visible && snapshot.selected.is_some()))
            .map(|question| FeedbackView {
                selected: snapshot.selected.clone(),
                correct: snapshot.last_correct,
                correct_logo_id: question.correct_logo_id.clone(),
            });

        Self {
            phase: snapshot.phase.into(),
            version: snapshot.version,
            remaining_secs: snapshot.remaining_secs,
            score: snapshot.score,
            question_index: snapshot.question_index,
            total_questions: snapshot.total_questions,
            question: snapshot
                .question
                .as_ref()
                .map(|question| QuestionView::from_question(question, images)),
            feedback,
            saved: snapshot.saved,
            load_error: snapshot.load_error.clone(),
            fallback_image: images.fallback_url.clone(),
        }
    }
}

/// Outcome of `POST /sessions/{id}/answer`.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct AnswerResponse {
    pub option_id: String,
    pub correct: bool,
    pub correct_logo_id: String,
    /// Score after this answer.
    pub score: u32,
}

impl From<AnswerOutcome> for AnswerResponse {
    fn from(value: AnswerOutcome) -> Self {
        Self {
            option_id: value.option_id,
            correct: value.correct,
            correct_logo_id: value.correct_logo_id,
            score: value.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{game::ResolvedOption, game_loop::GamePhase},
    };

    fn question(kind: QuestionKind) -> ResolvedQuestion {
        ResolvedQuestion {
            id: "q1".into(),
            kind,
            correct_logo_id: "a".into(),
            display_image: "https://cdn/a.png".into(),
            options: ["a", "b"]
                .iter()
                .map(|id| ResolvedOption {
                    id: (*id).into(),
                    name: id.to_uppercase(),
                    image_url: format!("https://cdn/{id}.png"),
                })
                .collect(),
        }
    }

    fn snapshot(question: ResolvedQuestion) -> GameSnapshot {
        GameSnapshot {
            phase: GamePhase::Active,
            version: 1,
            remaining_secs: 60,
            score: 0,
            question_index: 0,
            total_questions: 1,
            question: Some(question),
            selected: None,
            feedback_visible: false,
            last_correct: false,
            saved: None,
            load_error: None,
        }
    }

    #[test]
    fn name_guess_shows_logo_and_names() {
        let images = AppConfig::default().images;
        let view = QuestionView::from_question(&question(QuestionKind::NameGuess), &images);

        assert_eq!(view.kind, QuestionKindDto::TextOptions);
        assert_eq!(
            view.display_image.as_deref(),
            Some("https://cdn/a.png?width=200&quality=70")
        );
        assert_eq!(view.options[0].name.as_deref(), Some("A"));
        assert!(view.options.iter().all(|option| option.image.is_none()));
    }

    #[test]
    fn image_guess_hides_names_and_display_image() {
        let images = AppConfig::default().images;
        let view = QuestionView::from_question(&question(QuestionKind::ImageGuess), &images);

        assert_eq!(view.display_image, None);
        assert!(view.options.iter().all(|option| option.name.is_none()));
        assert_eq!(
            view.options[1].image.as_deref(),
            Some("https://cdn/b.png?width=150&quality=70")
        );
    }

    #[test]
    fn answer_is_hidden_until_feedback() {
        let images = AppConfig::default().images;
        let mut snapshot = snapshot(question(QuestionKind::NameGuess));

        let active = GameStateResponse::from_snapshot(&snapshot, &images);
        assert!(active.feedback.is_none());
        let json = serde_json::to_string(&active).unwrap();
        assert!(!json.contains("correct_logo_id"));

        snapshot.phase = GamePhase::Feedback;
        snapshot.selected = Some("b".into());
        snapshot.feedback_visible = true;
        let feedback = GameStateResponse::from_snapshot(&snapshot, &images)
            .feedback
            .unwrap();
        assert_eq!(feedback.correct_logo_id, "a");
        assert!(!feedback.correct);
    }

    #[test]
    fn answer_is_revealed_once_the_game_is_over() {
        let images = AppConfig::default().images;
        let mut snapshot = snapshot(question(QuestionKind::NameGuess));
        snapshot.phase = GamePhase::Ended;
        snapshot.saved = Some(true);

        let unanswered = GameStateResponse::from_snapshot(&snapshot, &images)
            .feedback
            .unwrap();
        assert_eq!(unanswered.correct_logo_id, "a");
        assert_eq!(unanswered.selected, None);

        snapshot.selected = Some("a".into());
        snapshot.last_correct = true;
        let answered = GameStateResponse::from_snapshot(&snapshot, &images)
            .feedback
            .unwrap();
        assert_eq!(answered.selected.as_deref(), Some("a"));
        assert!(answered.correct);
    }
}
