//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`PostgrestError`] failures.
pub type PostgrestResult<T> = Result<T, PostgrestError>;

/// Failures that can occur while talking to the PostgREST endpoint.
#[derive(Debug, Error)]
pub enum PostgrestError {
    /// Required environment variable is missing.
    #[error("missing PostgREST environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build PostgREST client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send PostgREST request to `{table}`")]
    RequestSend {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// PostgREST returned an unexpected status code.
    #[error("unexpected PostgREST response status {status} for `{table}`")]
    RequestStatus { table: String, status: StatusCode },
    /// Response payload could not be decoded into the expected rows.
    #[error("failed to decode PostgREST response for `{table}`")]
    DecodeResponse {
        table: String,
        #[source]
        source: reqwest::Error,
    },
    /// A row carried a value outside of the catalog contract.
    #[error("invalid row in `{table}`: {reason}")]
    InvalidRow { table: String, reason: String },
}

impl From<PostgrestError> for StorageError {
    fn from(err: PostgrestError) -> Self {
        match err {
            PostgrestError::InvalidRow { .. } => StorageError::InvalidData(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
