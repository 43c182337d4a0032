use crate::dao::models::{LogoEntity, QuestionKind};

/// A logo offered as an answer candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    /// Logo id, compared against [`ResolvedQuestion::correct_logo_id`].
    pub id: String,
    /// Display name of the logo.
    pub name: String,
    /// Image URI of the logo.
    pub image_url: String,
}

impl From<&LogoEntity> for ResolvedOption {
    fn from(logo: &LogoEntity) -> Self {
        Self {
            id: logo.id.clone(),
            name: logo.name.clone(),
            image_url: logo.image_url.clone(),
        }
    }
}

/// Question joined against the logo catalog, ready to be played.
///
/// `options` always holds exactly one entry whose id equals `correct_logo_id`, and its order is
/// fixed for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuestion {
    /// Question id from the catalog.
    pub id: String,
    /// Presentation mode.
    pub kind: QuestionKind,
    /// Logo that answers the question.
    pub correct_logo_id: String,
    /// Image of the correct logo, shown on name-guess questions.
    pub display_image: String,
    /// Candidates in display order.
    pub options: Vec<ResolvedOption>,
}

impl ResolvedQuestion {
    /// Whether `option_id` is one of the offered candidates.
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}
