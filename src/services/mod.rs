/// OpenAPI documentation generation.
pub mod documentation;
/// Per-session task driving the game loop controller.
pub mod game_runner;
/// Health check service.
pub mod health_service;
/// Image URL helpers.
pub mod image;
/// Leaderboard fetch and per-player dedup.
pub mod leaderboard_service;
/// Question sequence construction from the catalogs.
pub mod question_builder;
/// Player session and screen-flow operations.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Data source connection supervisor with degraded mode.
pub mod storage_supervisor;
