//! Builds the per-session question sequence from the raw catalogs.

use std::collections::{HashMap, HashSet};

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;
use tracing::debug;

use crate::{
    dao::{
        catalog_store::CatalogStore,
        models::{LogoEntity, QuestionEntity, QuestionKind},
        storage::StorageError,
    },
    state::game::{ResolvedOption, ResolvedQuestion},
};

/// Questions emitted from one kind before switching to the other.
const KIND_RUN: usize = 2;

/// Reasons a session cannot be assembled from the catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The logo catalog has no rows.
    #[error("logo catalog is empty")]
    NoLogos,
    /// The question catalog has no rows.
    #[error("question catalog is empty")]
    NoQuestions,
    /// Every question references a logo that does not exist.
    #[error("no question could be resolved against the logo catalog")]
    NoPlayableQuestions,
}

/// Failure of [`load_questions`].
#[derive(Debug, Error)]
pub enum QuestionLoadError {
    /// A catalog could not be fetched.
    #[error("failed to fetch catalogs")]
    Storage(#[from] StorageError),
    /// The catalogs were fetched but yield no session.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Fetch both catalogs and build a freshly shuffled sequence.
pub async fn load_questions(
    store: &dyn CatalogStore,
    fallback_image: &str,
) -> Result<Vec<ResolvedQuestion>, QuestionLoadError> {
    let (logos, questions) = tokio::try_join!(store.fetch_logos(), store.fetch_questions())?;
    debug!(
        logos = logos.len(),
        questions = questions.len(),
        "catalogs fetched"
    );
    let sequence = build_questions(&logos, &questions, fallback_image, &mut rand::rng())?;
    Ok(sequence)
}

/// Join questions against logos and order them for one session.
///
/// Unresolvable option ids are dropped and a question whose correct logo is unknown is skipped.
/// Each logo is quizzed at most once (first question in catalog order wins). Name-guess and
/// image-guess questions are shuffled separately, then emitted two by two starting with
/// name-guess; once a kind runs out the other continues alone. Option order is shuffled per
/// question.
pub fn build_questions<R>(
    logos: &[LogoEntity],
    questions: &[QuestionEntity],
    fallback_image: &str,
    rng: &mut R,
) -> Result<Vec<ResolvedQuestion>, BuildError>
where
    R: Rng + ?Sized,
{
    if logos.is_empty() {
        return Err(BuildError::NoLogos);
    }
    if questions.is_empty() {
        return Err(BuildError::NoQuestions);
    }

    let catalog: HashMap<&str, &LogoEntity> =
        logos.iter().map(|logo| (logo.id.as_str(), logo)).collect();

    let mut quizzed = HashSet::new();
    let mut name_guess = Vec::new();
    let mut image_guess = Vec::new();

    for question in questions {
        let Some(resolved) = resolve(question, &catalog, fallback_image) else {
            debug!(
                question_id = %question.id,
                correct_logo_id = %question.correct_logo_id,
                "skipping question with unknown correct logo"
            );
            continue;
        };

        if !quizzed.insert(resolved.correct_logo_id.clone()) {
            continue;
        }

        match resolved.kind {
            QuestionKind::NameGuess => name_guess.push(resolved),
            QuestionKind::ImageGuess => image_guess.push(resolved),
        }
    }

    if name_guess.is_empty() && image_guess.is_empty() {
        return Err(BuildError::NoPlayableQuestions);
    }

    name_guess.shuffle(rng);
    image_guess.shuffle(rng);

    let mut sequence = interleave(name_guess, image_guess, KIND_RUN);
    for question in &mut sequence {
        question.options.shuffle(rng);
    }

    Ok(sequence)
}

fn resolve(
    question: &QuestionEntity,
    catalog: &HashMap<&str, &LogoEntity>,
    fallback_image: &str,
) -> Option<ResolvedQuestion> {
    let correct = catalog.get(question.correct_logo_id.as_str())?;

    let mut seen = HashSet::new();
    let mut options: Vec<ResolvedOption> = question
        .option_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| catalog.get(id.as_str()))
        .map(|logo| with_fallback((*logo).into(), fallback_image))
        .collect();

    if !options.iter().any(|option| option.id == correct.id) {
        options.push(with_fallback((*correct).into(), fallback_image));
    }

    Some(ResolvedQuestion {
        id: question.id.clone(),
        kind: question.kind,
        correct_logo_id: correct.id.clone(),
        display_image: image_or_fallback(&correct.image_url, fallback_image),
        options,
    })
}

fn with_fallback(mut option: ResolvedOption, fallback_image: &str) -> ResolvedOption {
    option.image_url = image_or_fallback(&option.image_url, fallback_image);
    option
}

fn image_or_fallback(url: &str, fallback_image: &str) -> String {
    if url.trim().is_empty() {
        fallback_image.to_string()
    } else {
        url.to_string()
    }
}

/// Emit up to `run` items from `first`, then up to `run` from `second`, until both are empty.
fn interleave<T>(first: Vec<T>, second: Vec<T>, run: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();

    loop {
        let before = out.len();
        out.extend(first.by_ref().take(run));
        out.extend(second.by_ref().take(run));
        if out.len() == before {
            break;
        }
    }

    out
}
