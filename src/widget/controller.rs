//! Submit handling for the chat form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, error};

use super::error::{Result, WidgetError};
use super::message::{
    ChatRequest, EMPTY_RESPONSE_TEXT, Message, MessageHandle, NETWORK_ERROR_TEXT, usable_text,
};
use super::transport::{ChatTransport, RawReply};
use super::view::ChatView;

/// How a single submission ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing shown, nothing sent.
    Skipped,
    /// The server's `response` text was shown.
    Answered,
    /// The server answered without usable text; the empty-response
    /// fallback was shown.
    FallbackText,
    /// The request failed; the network-error fallback was shown.
    Failed(WidgetError),
}

/// Handle to the loading animation of one in-flight submission.
///
/// Removal consumes the handle, so the placeholder disappears at most once
/// even when both the receipt path and the error path try to remove it.
#[derive(Debug)]
struct LoadingPlaceholder(Option<MessageHandle>);

impl LoadingPlaceholder {
    fn remove<V: ChatView>(&mut self, view: &mut V) {
        if let Some(handle) = self.0.take() {
            view.remove(handle);
        }
    }
}

/// Binds a [`ChatView`] to a [`ChatTransport`].
///
/// The controller is cheap to clone; clones share the same view. Calls to
/// [`ChatController::submit`] are independent: overlapping submissions each
/// get their own placeholder and reply.
pub struct ChatController<V, T> {
    view: Arc<Mutex<V>>,
    transport: Arc<T>,
}

impl<V, T> Clone for ChatController<V, T> {
    fn clone(&self) -> Self {
        Self {
            view: Arc::clone(&self.view),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<V, T> std::fmt::Debug for ChatController<V, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController").finish_non_exhaustive()
    }
}

impl<V: ChatView, T: ChatTransport> ChatController<V, T> {
    pub fn new(view: V, transport: T) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
            transport: Arc::new(transport),
        }
    }

    /// Shared view, e.g. to type into the input or inspect the chat box.
    pub fn view(&self) -> &Arc<Mutex<V>> {
        &self.view
    }

    /// Handle a submit of the chat form.
    pub async fn submit(&self) -> SubmitOutcome {
        let (message, mut placeholder) = {
            let mut view = self.lock();
            let message = view.input_text().trim().to_string();
            if message.is_empty() {
                return SubmitOutcome::Skipped;
            }

            Self::append(&mut *view, &Message::user(message.as_str()));
            view.clear_input();
            let handle = Self::append(&mut *view, &Message::loading());
            (message, LoadingPlaceholder(Some(handle)))
        };

        debug!(length = message.len(), "Sending chat message");

        let request = ChatRequest { message };
        let result = self.transport.post_chat(&request).await;

        let mut view = self.lock();
        placeholder.remove(&mut *view);

        match result.and_then(|reply| Self::interpret(&reply)) {
            Ok(Some(text)) => {
                Self::append(&mut *view, &Message::bot(text));
                SubmitOutcome::Answered
            }
            Ok(None) => {
                Self::append(&mut *view, &Message::bot(EMPTY_RESPONSE_TEXT));
                SubmitOutcome::FallbackText
            }
            Err(e) => {
                error!(error = %e, "Chat request failed");
                placeholder.remove(&mut *view);
                Self::append(&mut *view, &Message::bot(NETWORK_ERROR_TEXT));
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Status check and body parse. `Ok(None)` means no usable `response`:
    /// the field is missing or falsy, or the body is not an object at all.
    fn interpret(reply: &RawReply) -> Result<Option<String>> {
        if !reply.is_success() {
            return Err(WidgetError::Status {
                status: reply.status,
            });
        }
        match serde_json::from_str::<Value>(&reply.body)? {
            Value::Null => Err(WidgetError::NullBody),
            Value::Object(fields) => Ok(usable_text(fields.get("response"))),
            _ => Ok(None),
        }
    }

    fn append(view: &mut V, message: &Message) -> MessageHandle {
        let handle = view.append(message);
        view.scroll_to_bottom();
        handle
    }

    fn lock(&self) -> MutexGuard<'_, V> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
