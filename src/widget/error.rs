//! Error types for the chat widget.

use thiserror::Error;

/// Why a submission ended on the network-error fallback.
#[derive(Error, Debug)]
pub enum WidgetError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("network response was not ok ({status})")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The success body was not valid JSON.
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The success body was the JSON literal `null`.
    #[error("response body was null")]
    NullBody,

    /// The endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for WidgetError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, WidgetError>;
