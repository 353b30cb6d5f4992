//! Messages shown in the chat box and the `/chat` wire types.

use serde::{Deserialize, Serialize};

/// Shown when the server answered but gave no usable `response`.
pub const EMPTY_RESPONSE_TEXT: &str = "Sorry, failed to generate a response.";

/// Shown when the request failed: transport error, non-2xx status or bad JSON.
pub const NETWORK_ERROR_TEXT: &str = "Sorry, an error occurred communicating with the server.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person at the keyboard.
    User,
    /// Produced by the recommender (or a fallback standing in for it).
    Bot,
}

impl Sender {
    /// CSS class selecting the bubble style for this sender.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// A single entry in the chat box.
///
/// Messages are immutable once appended. The only lifecycle event is the
/// removal of a loading placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Plain text content; empty for a loading placeholder.
    pub text: String,
    /// Author of the message.
    pub sender: Sender,
    /// True only for the transient "waiting for reply" animation.
    pub loading: bool,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            loading: false,
        }
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            loading: false,
        }
    }

    /// Bot-role placeholder rendered as a loading animation.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            text: String::new(),
            sender: Sender::Bot,
            loading: true,
        }
    }
}

/// Identity a view assigns to an appended message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageHandle(pub u64);

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's (trimmed) question.
    pub message: String,
}

/// Success body for `POST /chat`.
///
/// `response` is loosely typed: a missing, null, empty or otherwise falsy
/// value is tolerated and replaced with [`EMPTY_RESPONSE_TEXT`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl ChatReply {
    #[must_use]
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(serde_json::Value::String(response.into())),
        }
    }

    /// The text to display, or `None` when the value is falsy.
    #[must_use]
    pub fn usable_text(&self) -> Option<String> {
        usable_text(self.response.as_ref())
    }
}

/// Display text for a `response` value; `None` when absent or falsy.
#[must_use]
pub fn usable_text(response: Option<&serde_json::Value>) -> Option<String> {
    use serde_json::Value;

    match response? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Error body returned by `POST /chat` on 4xx/5xx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
