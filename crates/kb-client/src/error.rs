use thiserror::Error;

/// Errors surfaced by the API client.
///
/// `Timeout` is split out from `Transport` so callers can show the
/// timeout-specific message the UI contract expects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API Error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("{0}")]
    Application(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(err)
        }
    }
}

impl ApiError {
    /// True when the failure happened before any server response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::Transport(_))
    }
}
