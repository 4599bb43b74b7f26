use reqwest::StatusCode;

/// Why a fetch cycle failed.
///
/// Both kinds end up in [`crate::FetchState::error`]; the display string is
/// what a view shows, the variant is what callers branch on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// A response arrived, but with a status outside 200-299.
    #[error("HTTP error! status: {}", .status.as_u16())]
    Http { status: StatusCode },
    /// No usable response: the connection failed, the request could not be
    /// built, or the body was not valid JSON for the expected type.
    #[error("{message}")]
    Transport { message: String },
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unknown transport error".to_string()
        } else {
            message
        };
        FetchError::Transport { message }
    }

    /// The response status, if the failure came from a received response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Http { status } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, FetchError::Http { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::transport(format!("Invalid response body: {e}"))
    }
}

/// Errors building a [`crate::FetchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid header name")]
    HeaderName(#[from] reqwest::header::InvalidHeaderName),
    #[error("Invalid header value")]
    HeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}
