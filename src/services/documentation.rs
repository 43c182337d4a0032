use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Logo Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::sessions::create_session,
        crate::routes::sessions::get_session,
        crate::routes::sessions::delete_session,
        crate::routes::sessions::play_now,
        crate::routes::sessions::submit_username,
        crate::routes::sessions::start_game,
        crate::routes::sessions::get_game,
        crate::routes::sessions::submit_answer,
        crate::routes::sessions::get_results,
        crate::routes::sessions::restart,
        crate::routes::sse::public_stream,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::leaderboard::LeaderboardView,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::UsernameRequest,
            crate::dto::session::AnswerRequest,
            crate::dto::session::ResultsResponse,
            crate::dto::game::GameStateResponse,
            crate::dto::game::QuestionView,
            crate::dto::game::OptionView,
            crate::dto::game::FeedbackView,
            crate::dto::game::AnswerResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::GameOverEvent,
            crate::dto::sse::LoadFailedEvent,
            crate::dto::sse::LeaderboardUpdatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "leaderboard", description = "Top scores"),
        (name = "sessions", description = "Player sessions and screen flow"),
        (name = "game", description = "Gameplay of a running session"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/sessions/{id}/answer"));
        assert!(doc.paths.paths.contains_key("/leaderboard"));
    }
}
