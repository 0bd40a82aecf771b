use reqwest::StatusCode;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Jira request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` holds Jira's `errorMessages` / `errors`
    /// when the body carries them, otherwise the raw body (truncated).
    #[error("Jira returned HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Unexpected Jira response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, JiraError>;
