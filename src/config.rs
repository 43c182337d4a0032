//! Application-level configuration loading: game timing, leaderboard sizes and image tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LOGO_QUIZ_CONFIG_PATH";

const DEFAULT_SESSION_SECS: u32 = 60;
const DEFAULT_DWELL_MS: u64 = 1_000;
const DEFAULT_TICK_MS: u64 = 1_000;
const DEFAULT_FETCH_LIMIT: usize = 50;
const DEFAULT_LANDING_COUNT: usize = 5;
const DEFAULT_RESULTS_COUNT: usize = 10;
const DEFAULT_FALLBACK_IMAGE: &str = "/placeholder.svg";
const DEFAULT_LOGO_WIDTH: u32 = 200;
const DEFAULT_OPTION_WIDTH: u32 = 150;
const DEFAULT_IMAGE_QUALITY: u32 = 70;
const DEFAULT_IDLE_TTL_SECS: u64 = 1_800;

/// Timing of a single game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Countdown budget of a whole session, in seconds.
    pub session_secs: u32,
    /// How long answer feedback stays visible before advancing.
    pub dwell: Duration,
    /// Real-time length of one countdown tick.
    pub tick: Duration,
}

/// Sizes used when querying and displaying the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardConfig {
    /// Server-side cap on fetched rows, before client-side dedup.
    pub fetch_limit: usize,
    /// Unique players shown on the landing view.
    pub landing_count: usize,
    /// Unique players shown on the results view.
    pub results_count: usize,
}

/// Image URL tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// Placeholder substituted for missing or broken images.
    pub fallback_url: String,
    /// Requested width of the logo shown on name-guess questions.
    pub logo_width: u32,
    /// Requested width of image options on image-guess questions.
    pub option_width: u32,
    /// Requested encoding quality.
    pub quality: u32,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Game loop timing.
    pub game: GameConfig,
    /// Leaderboard sizes.
    pub leaderboard: LeaderboardConfig,
    /// Image URL tuning.
    pub images: ImageConfig,
    /// Sessions idle longer than this (outside of a game) are reaped.
    pub session_idle_ttl: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        session_secs = app_config.game.session_secs,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document. Missing sections and zero values keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    game: RawGame,
    leaderboard: RawLeaderboard,
    images: RawImages,
    sessions: RawSessions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGame {
    session_secs: Option<u32>,
    dwell_ms: Option<u64>,
    tick_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLeaderboard {
    fetch_limit: Option<usize>,
    landing_count: Option<usize>,
    results_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawImages {
    fallback_url: Option<String>,
    logo_width: Option<u32>,
    option_width: Option<u32>,
    quality: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSessions {
    idle_ttl_secs: Option<u64>,
}

/// Keep `value` unless it is absent or zero.
fn positive<T>(value: Option<T>, default: T, field: &'static str) -> T
where
    T: Default + PartialEq + Copy,
{
    match value {
        Some(v) if v == T::default() => {
            warn!(field, "zero is not allowed; keeping default");
            default
        }
        Some(v) => v,
        None => default,
    }
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let fallback_url = raw
            .images
            .fallback_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_IMAGE.to_string());

        Self {
            game: GameConfig {
                session_secs: positive(
                    raw.game.session_secs,
                    DEFAULT_SESSION_SECS,
                    "game.session_secs",
                ),
                dwell: Duration::from_millis(positive(
                    raw.game.dwell_ms,
                    DEFAULT_DWELL_MS,
                    "game.dwell_ms",
                )),
                tick: Duration::from_millis(positive(
                    raw.game.tick_ms,
                    DEFAULT_TICK_MS,
                    "game.tick_ms",
                )),
            },
            leaderboard: LeaderboardConfig {
                fetch_limit: positive(
                    raw.leaderboard.fetch_limit,
                    DEFAULT_FETCH_LIMIT,
                    "leaderboard.fetch_limit",
                ),
                landing_count: positive(
                    raw.leaderboard.landing_count,
                    DEFAULT_LANDING_COUNT,
                    "leaderboard.landing_count",
                ),
                results_count: positive(
                    raw.leaderboard.results_count,
                    DEFAULT_RESULTS_COUNT,
                    "leaderboard.results_count",
                ),
            },
            images: ImageConfig {
                fallback_url,
                logo_width: positive(raw.images.logo_width, DEFAULT_LOGO_WIDTH, "images.logo_width"),
                option_width: positive(
                    raw.images.option_width,
                    DEFAULT_OPTION_WIDTH,
                    "images.option_width",
                ),
                quality: positive(raw.images.quality, DEFAULT_IMAGE_QUALITY, "images.quality"),
            },
            session_idle_ttl: Duration::from_secs(positive(
                raw.sessions.idle_ttl_secs,
                DEFAULT_IDLE_TTL_SECS,
                "sessions.idle_ttl_secs",
            )),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_values() {
        let config = AppConfig::default();
        assert_eq!(config.game.session_secs, 60);
        assert_eq!(config.game.dwell, Duration::from_millis(1_000));
        assert_eq!(config.game.tick, Duration::from_secs(1));
        assert_eq!(config.leaderboard.fetch_limit, 50);
        assert_eq!(config.leaderboard.landing_count, 5);
        assert_eq!(config.leaderboard.results_count, 10);
        assert_eq!(config.images.fallback_url, "/placeholder.svg");
    }

    #[test]
    fn partial_documents_override_only_given_fields() {
        let config =
            AppConfig::from_json(r#"{ "game": { "session_secs": 180, "dwell_ms": 500 } }"#)
                .unwrap();
        assert_eq!(config.game.session_secs, 180);
        assert_eq!(config.game.dwell, Duration::from_millis(500));
        assert_eq!(config.game.tick, Duration::from_secs(1));
        assert_eq!(config.leaderboard.results_count, 10);
    }

    #[test]
    fn zero_values_fall_back_to_defaults() {
        let config = AppConfig::from_json(
            r#"{ "game": { "session_secs": 0 }, "leaderboard": { "landing_count": 0 }, "images": { "fallback_url": "  " } }"#,
        )
        .unwrap();
        assert_eq!(config.game.session_secs, 60);
        assert_eq!(config.leaderboard.landing_count, 5);
        assert_eq!(config.images.fallback_url, "/placeholder.svg");
    }

    #[test]
    fn malformed_documents_are_errors() {
        assert!(AppConfig::from_json(r#"{ "game": { "session_secs": "soon" } }"#).is_err());
    }
}
