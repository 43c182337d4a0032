use super::error::{PostgrestError, PostgrestResult};

/// Runtime configuration describing how to reach the Supabase/PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Anonymous or service key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Path prefix of the REST API on the project host.
    pub rest_path: String,
}

impl PostgrestConfig {
    /// Construct a configuration from an explicit project URL and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            rest_path: "rest/v1".into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> PostgrestResult<Self> {
        let base_url = std::env::var("SUPABASE_URL").map_err(|_| PostgrestError::MissingEnvVar {
            var: "SUPABASE_URL",
        })?;
        let api_key = std::env::var("SUPABASE_KEY").map_err(|_| PostgrestError::MissingEnvVar {
            var: "SUPABASE_KEY",
        })?;

        Ok(Self::new(base_url, api_key))
    }
}
