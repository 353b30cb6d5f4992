//! Chat widget: the form-to-endpoint controller and its message list.
//!
//! The page exposes three elements, [`CHAT_FORM_ID`], [`USER_INPUT_ID`] and
//! [`CHAT_BOX_ID`]. On submit the [`ChatController`] shows the user's text,
//! shows a loading placeholder, posts the text to [`CHAT_PATH`] and replaces
//! the placeholder with the reply (or a fallback text).
//!
//! The controller is generic over where it draws ([`ChatView`]) and how it
//! talks to the server ([`ChatTransport`]):
//!
//! - [`HtmlChatBox`]: in-memory model of the `chat-box` element
//! - [`ConsoleView`]: terminal output, used by `music-chat chat`
//! - [`HttpTransport`]: reqwest client for `POST /chat`

pub mod console;
pub mod controller;
pub mod error;
pub mod message;
pub mod render;
pub mod transport;
pub mod view;

pub use console::ConsoleView;
pub use controller::{ChatController, SubmitOutcome};
pub use error::WidgetError;
pub use message::{
    ChatReply, ChatRequest, EMPTY_RESPONSE_TEXT, ErrorBody, Message, MessageHandle,
    NETWORK_ERROR_TEXT, Sender,
};
pub use transport::{ChatTransport, HttpTransport, RawReply};
pub use view::{ChatView, HtmlChatBox};

/// Endpoint the widget posts to.
pub const CHAT_PATH: &str = "/chat";

/// The form whose submit triggers a send.
pub const CHAT_FORM_ID: &str = "chat-form";

/// The text input holding the user's message.
pub const USER_INPUT_ID: &str = "user-input";

/// The scrollable message container.
pub const CHAT_BOX_ID: &str = "chat-box";
