use crate::{
    config,
    http::{self, StatusCode},
    model::ValidationError,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by [`crate::ApiClient`]. Nothing is retried; each variant
/// tells the caller which layer gave up.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client could not be set up from the configuration.
    #[error(transparent)]
    Config(#[from] config::Error),
    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error(transparent)]
    Http(#[from] http::Error),
    /// The service answered with a non-2xx status the caller did not ask for.
    #[error("{status} for url {url}: {body}")]
    Status {
        status: StatusCode,
        url: url::Url,
        body: String,
    },
    /// The service answered with a status other than the one required.
    #[error("Expected status {} but got {}. Response: {body}", expected.as_u16(), actual.as_u16())]
    StatusMismatch {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },
    #[error("auth response did not contain a token: {0}")]
    MissingToken(String),
    #[error("failed to decode response body as JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response validation Error: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Status code carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::StatusMismatch { actual, .. } => Some(*actual),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(http::Error::Timeout(_)))
    }
}
