use thiserror::Error;

/// Failure of a single user action. Never fatal to the page: handlers log it
/// and surface a notification.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("invalid response body: {0}")]
    Parse(String),

    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ActionError {
    pub fn transport(err: impl std::error::Error) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn parse(err: impl std::error::Error) -> Self {
        Self::Parse(err.to_string())
    }

    pub fn invalid_url(url: impl Into<String>, err: impl std::error::Error) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err)
    }
}
