use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        game::{AnswerResponse, GameStateResponse},
        session::{AnswerRequest, ResultsResponse, SessionSnapshot, UsernameRequest},
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Player session endpoints walking the screen flow and playing the game.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/play", post(play_now))
        .route("/sessions/{id}/username", put(submit_username))
        .route("/sessions/{id}/start", post(start_game))
        .route("/sessions/{id}/game", get(get_game))
        .route("/sessions/{id}/answer", post(submit_answer))
        .route("/sessions/{id}/results", get(get_results))
        .route("/sessions/{id}/restart", post(restart))
}

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    responses((status = 201, description = "Session created on the landing screen", body = SessionSnapshot))
)]
/// Create a player session.
pub async fn create_session(
    State(state): State<SharedState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    (
        StatusCode::CREATED,
        Json(session_service::create_session(&state)),
    )
}

#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Current screen", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
/// Return the screen-flow snapshot of a session.
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::get_session(&state, id)?))
}

#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session dropped"),
        (status = 404, description = "Unknown session")
    )
)]
/// Drop a session and stop its game.
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    session_service::delete_session(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/play",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Moved to the username screen", body = SessionSnapshot),
        (status = 409, description = "Not on the landing screen")
    )
)]
/// Leave the landing screen.
pub async fn play_now(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::play_now(&state, id)?))
}

#[utoipa::path(
    put,
    path = "/sessions/{id}/username",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = UsernameRequest,
    responses(
        (status = 200, description = "Moved to the ready screen", body = SessionSnapshot),
        (status = 400, description = "Blank or too long username"),
        (status = 409, description = "Not on the username screen")
    )
)]
/// Store the player's name.
pub async fn submit_username(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UsernameRequest>>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::submit_username(
        &state,
        id,
        &payload.username,
    )?))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/start",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Game loading", body = SessionSnapshot),
        (status = 409, description = "Not on the ready screen")
    )
)]
/// Start a game for the session.
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::start_game(&state, id)?))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/game",
    tag = "game",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Current game state", body = GameStateResponse),
        (status = 409, description = "No game started")
    )
)]
/// Return the current game state.
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, AppError> {
    Ok(Json(session_service::game_state(&state, id)?))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/answer",
    tag = "game",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = AnswerResponse),
        (status = 400, description = "Option not offered by the current question"),
        (status = 409, description = "No question awaiting an answer")
    )
)]
/// Answer the current question.
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AnswerRequest>>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = session_service::submit_answer(&state, id, payload.option_id).await?;
    Ok(Json(answer))
}

#[utoipa::path(
    get,
    path = "/sessions/{id}/results",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Final score and leaderboard", body = ResultsResponse),
        (status = 409, description = "Game not over")
    )
)]
/// Return the results screen.
pub async fn get_results(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultsResponse>, AppError> {
    Ok(Json(session_service::results(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/sessions/{id}/restart",
    tag = "sessions",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Back on the landing screen", body = SessionSnapshot),
        (status = 409, description = "Game still running")
    )
)]
/// Play again.
pub async fn restart(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::restart(&state, id)?))
}
