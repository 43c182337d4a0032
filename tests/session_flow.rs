use std::{sync::Arc, time::Duration};

use logo_quiz_back::{
    config::AppConfig,
    dao::{
        catalog_store::memory::{CatalogSeed, InMemoryCatalogStore},
        models::{LeaderboardEntryEntity, LogoEntity, QuestionEntity, QuestionKind},
    },
    dto::{leaderboard::LeaderboardView, phase::VisibleScreen},
    error::ServiceError,
    services::{leaderboard_service, session_service},
    state::{AppState, SharedState, game_loop::GamePhase},
};
use time::OffsetDateTime;
use uuid::Uuid;

fn logo(id: &str) -> LogoEntity {
    LogoEntity {
        id: id.into(),
        name: id.to_uppercase(),
        image_url: format!("https://cdn/{id}.png"),
    }
}

fn question(id: &str, kind: QuestionKind, correct: &str, options: &[&str]) -> QuestionEntity {
    QuestionEntity {
        id: id.into(),
        kind,
        correct_logo_id: correct.into(),
        option_ids: options.iter().map(|o| (*o).into()).collect(),
    }
}

fn seed() -> CatalogSeed {
    CatalogSeed {
        logos: ["a", "b", "c", "d", "e", "f"].into_iter().map(logo).collect(),
        questions: vec![
            question("q1", QuestionKind::NameGuess, "a", &["a", "b", "c"]),
            question("q2", QuestionKind::ImageGuess, "d", &["d", "e", "f"]),
            question("q3", QuestionKind::NameGuess, "b", &["b", "c", "e"]),
        ],
        leaderboard: Vec::new(),
    }
}

async fn state_with(config: AppConfig, store: &InMemoryCatalogStore) -> SharedState {
    let state = AppState::new(config);
    state.install_catalog_store(Arc::new(store.clone())).await;
    state
}

fn ready_session(state: &SharedState, username: &str) -> Uuid {
    let id = session_service::create_session(state).id;
    session_service::play_now(state, id).unwrap();
    session_service::submit_username(state, id, username).unwrap();
    id
}

async fn wait_for_phase(state: &SharedState, id: Uuid, phase: GamePhase) {
    let mut snapshots = session_service::watch_game(state, id).unwrap();
    snapshots
        .wait_for(|snapshot| snapshot.phase == phase)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn answering_every_question_reaches_results_with_one_saved_row() {
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(AppConfig::default(), &store).await;
    let id = ready_session(&state, "ada");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Active).await;

    let mut snapshots = session_service::watch_game(&state, id).unwrap();
    for round in 0..3 {
        let current = snapshots
            .wait_for(|s| s.phase == GamePhase::Active && s.question_index == round)
            .await
            .unwrap()
            .clone();
        let question = current.question.unwrap();
        let answer = session_service::submit_answer(&state, id, question.correct_logo_id.clone())
            .await
            .unwrap();
        assert!(answer.correct);
        assert_eq!(answer.score as usize, round + 1);
    }

    wait_for_phase(&state, id, GamePhase::Ended).await;

    let session = session_service::get_session(&state, id).unwrap();
    assert_eq!(session.screen, VisibleScreen::Results);
    assert_eq!(session.final_score, 3);

    let results = session_service::results(&state, id).await.unwrap();
    assert!(results.saved);
    assert_eq!(results.score, 3);
    assert!(results.leaderboard.available);
    assert!(results.leaderboard.entries[0].is_current_player);

    assert_eq!(store.leaderboard_rows().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_saves_exactly_once() {
    let config = AppConfig::from_json(r#"{ "game": { "session_secs": 3 } }"#).unwrap();
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(config, &store).await;
    let id = ready_session(&state, "bob");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Ended).await;

    let game = session_service::game_state(&state, id).unwrap();
    assert_eq!(game.remaining_secs, 0);
    assert_eq!(game.saved, Some(true));

    tokio::time::sleep(Duration::from_secs(10)).await;
    let rows = store.leaderboard_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "bob");
    assert_eq!(rows[0].score, 0);
}

#[tokio::test(start_paused = true)]
async fn time_running_out_during_feedback_still_saves_once() {
    let config = AppConfig::from_json(r#"{ "game": { "session_secs": 1, "dwell_ms": 5000 } }"#)
        .unwrap();
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(config, &store).await;
    let id = ready_session(&state, "cy");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Active).await;
    let question = session_service::watch_game(&state, id)
        .unwrap()
        .borrow()
        .question
        .clone()
        .unwrap();
    session_service::submit_answer(&state, id, question.correct_logo_id)
        .await
        .unwrap();

    wait_for_phase(&state, id, GamePhase::Ended).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let rows = store.leaderboard_rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, 1);
}

#[tokio::test(start_paused = true)]
async fn last_dwell_and_time_zero_on_the_same_instant_finish_cleanly() {
    let config = AppConfig::from_json(
        r#"{ "game": { "session_secs": 1, "dwell_ms": 1000, "tick_ms": 1000 } }"#,
    )
    .unwrap();
    let store = InMemoryCatalogStore::new(CatalogSeed {
        questions: vec![question("q1", QuestionKind::NameGuess, "a", &["a", "b", "c"])],
        ..seed()
    });
    let state = state_with(config, &store).await;
    let id = ready_session(&state, "zed");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Active).await;
    session_service::submit_answer(&state, id, "a".into())
        .await
        .unwrap();

    wait_for_phase(&state, id, GamePhase::Ended).await;
    let game = session_service::game_state(&state, id).unwrap();
    assert_eq!(game.remaining_secs, 1);
    assert_eq!(game.score, 1);
    assert_eq!(game.saved, Some(true));
    assert_eq!(game.feedback.unwrap().correct_logo_id, "a");

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(store.leaderboard_rows().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_append_still_ends_the_game() {
    let config = AppConfig::from_json(r#"{ "game": { "session_secs": 2 } }"#).unwrap();
    let store = InMemoryCatalogStore::new(seed());
    store.set_fail_appends(true);
    let state = state_with(config, &store).await;
    let id = ready_session(&state, "dee");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Ended).await;

    let results = session_service::results(&state, id).await.unwrap();
    assert!(!results.saved);
    assert_eq!(results.score, 0);
    assert!(store.leaderboard_rows().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn answer_errors_leave_the_game_untouched() {
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(AppConfig::default(), &store).await;
    let id = ready_session(&state, "eve");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Active).await;

    let err = session_service::submit_answer(&state, id, "zzz".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(session_service::game_state(&state, id).unwrap().score, 0);

    let question = session_service::watch_game(&state, id)
        .unwrap()
        .borrow()
        .question
        .clone()
        .unwrap();
    let wrong = question
        .options
        .iter()
        .find(|option| option.id != question.correct_logo_id)
        .unwrap()
        .id
        .clone();
    let answer = session_service::submit_answer(&state, id, wrong)
        .await
        .unwrap();
    assert!(!answer.correct);
    assert_eq!(answer.correct_logo_id, question.correct_logo_id);

    let err = session_service::submit_answer(&state, id, question.correct_logo_id.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let game = session_service::game_state(&state, id).unwrap();
    assert_eq!(game.score, 0);
    let feedback = game.feedback.unwrap();
    assert!(!feedback.correct);
    assert_eq!(feedback.correct_logo_id, question.correct_logo_id);
}

#[tokio::test(start_paused = true)]
async fn empty_catalog_reports_load_failure_and_allows_restart() {
    let store = InMemoryCatalogStore::default();
    let state = state_with(AppConfig::default(), &store).await;
    let id = ready_session(&state, "fay");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::LoadFailed).await;

    let session = session_service::get_session(&state, id).unwrap();
    assert_eq!(session.screen, VisibleScreen::Game);
    assert!(session.load_error.is_some());
    assert!(matches!(
        session_service::results(&state, id).await,
        Err(ServiceError::InvalidState(_))
    ));

    let session = session_service::restart(&state, id).unwrap();
    assert_eq!(session.screen, VisibleScreen::Landing);
    assert_eq!(session.username.as_deref(), Some("fay"));
    assert_eq!(session.final_score, 0);
    assert!(store.leaderboard_rows().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn degraded_mode_fails_the_load() {
    let state = AppState::new(AppConfig::default());
    let id = ready_session(&state, "gus");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::LoadFailed).await;

    let game = session_service::game_state(&state, id).unwrap();
    assert!(game.load_error.unwrap().contains("unavailable"));

    let board = leaderboard_service::fetch_leaderboard(&state, LeaderboardView::Landing).await;
    assert!(!board.available);
    assert!(board.entries.is_empty());
}

#[tokio::test(start_paused = true)]
async fn deleting_a_session_stops_its_game_without_saving() {
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(AppConfig::default(), &store).await;
    let id = ready_session(&state, "hal");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Active).await;
    let mut snapshots = session_service::watch_game(&state, id).unwrap();

    session_service::delete_session(&state, id).unwrap();
    while snapshots.changed().await.is_ok() {}

    assert_ne!(snapshots.borrow().phase, GamePhase::Ended);
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(store.leaderboard_rows().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn restart_after_results_plays_a_fresh_game() {
    let config = AppConfig::from_json(r#"{ "game": { "session_secs": 1 } }"#).unwrap();
    let store = InMemoryCatalogStore::new(seed());
    let state = state_with(config, &store).await;
    let id = ready_session(&state, "ivy");

    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Ended).await;
    session_service::restart(&state, id).unwrap();
    assert!(session_service::game_state(&state, id).is_err());

    session_service::play_now(&state, id).unwrap();
    session_service::submit_username(&state, id, "ivy").unwrap();
    session_service::start_game(&state, id).unwrap();
    wait_for_phase(&state, id, GamePhase::Ended).await;

    assert_eq!(store.leaderboard_rows().await.len(), 2);
}

#[tokio::test]
async fn leaderboard_keeps_each_players_best_score() {
    let rows: Vec<_> = [("x", 50), ("y", 80), ("x", 30), ("z", 10)]
        .into_iter()
        .map(|(username, score)| LeaderboardEntryEntity {
            username: username.into(),
            score,
            created_at: OffsetDateTime::UNIX_EPOCH,
        })
        .collect();
    let store = InMemoryCatalogStore::new(CatalogSeed {
        leaderboard: rows,
        ..seed()
    });
    let config = AppConfig::from_json(r#"{ "leaderboard": { "landing_count": 2 } }"#).unwrap();
    let state = state_with(config, &store).await;

    let landing = leaderboard_service::fetch_leaderboard(&state, LeaderboardView::Landing).await;
    let pairs: Vec<_> = landing
        .entries
        .iter()
        .map(|entry| (entry.rank, entry.username.as_str(), entry.score))
        .collect();
    assert_eq!(pairs, vec![(1, "y", 80), (2, "x", 50)]);

    let results = leaderboard_service::fetch_leaderboard(&state, LeaderboardView::Results).await;
    assert_eq!(results.entries.len(), 3);
}
