//! The surface the controller draws on.

use super::message::{Message, MessageHandle};
use super::render::message_html;
use super::CHAT_BOX_ID;

/// Operations the controller needs from the page.
///
/// A view owns both the `user-input` value and the `chat-box` contents.
pub trait ChatView: Send {
    /// Current raw value of the input field.
    fn input_text(&self) -> String;

    /// Empty the input field.
    fn clear_input(&mut self);

    /// Append a message at the end of the chat box.
    fn append(&mut self, message: &Message) -> MessageHandle;

    /// Remove a previously appended message. Returns `false` if it was
    /// already gone.
    fn remove(&mut self, handle: MessageHandle) -> bool;

    /// Scroll the chat box so the newest message is visible.
    fn scroll_to_bottom(&mut self);
}

#[derive(Debug, Clone)]
struct Entry {
    handle: MessageHandle,
    message: Message,
    html: String,
    height: u32,
}

/// In-memory model of the `chat-box` element and its `user-input` field.
///
/// Heights are computed from line counts, which is enough to reason about
/// scrolling without a layout engine.
#[derive(Debug, Clone)]
pub struct HtmlChatBox {
    input: String,
    entries: Vec<Entry>,
    next_handle: u64,
    client_height: u32,
    line_height: u32,
    bubble_padding: u32,
    scroll_top: u32,
}

impl Default for HtmlChatBox {
    fn default() -> Self {
        Self::new(400)
    }
}

impl HtmlChatBox {
    /// Create an empty chat box with the given visible height in pixels.
    #[must_use]
    pub fn new(client_height: u32) -> Self {
        Self {
            input: String::new(),
            entries: Vec::new(),
            next_handle: 0,
            client_height,
            line_height: 20,
            bubble_padding: 24,
            scroll_top: 0,
        }
    }

    /// Simulate typing into `user-input`.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Messages currently shown, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().map(|e| &e.message)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loading placeholders still on screen.
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| e.message.loading).count()
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Total content height, never less than the visible height.
    pub fn scroll_height(&self) -> u32 {
        let content: u32 = self.entries.iter().map(|e| e.height).sum();
        content.max(self.client_height)
    }

    pub fn client_height(&self) -> u32 {
        self.client_height
    }

    /// Largest reachable `scroll_top`.
    pub fn max_scroll_top(&self) -> u32 {
        self.scroll_height() - self.client_height
    }

    /// Render the chat box element with all its children.
    pub fn to_html(&self) -> String {
        let mut html = format!(r#"<div id="{CHAT_BOX_ID}" class="chat-box">"#);
        for entry in &self.entries {
            html.push_str(&entry.html);
        }
        html.push_str("</div>");
        html
    }

    fn height_of(&self, message: &Message) -> u32 {
        let lines = if message.loading {
            1
        } else {
            u32::try_from(message.text.lines().count().max(1)).unwrap_or(u32::MAX)
        };
        self.bubble_padding
            .saturating_add(lines.saturating_mul(self.line_height))
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }
}

impl ChatView for HtmlChatBox {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append(&mut self, message: &Message) -> MessageHandle {
        let handle = MessageHandle(self.next_handle);
        self.next_handle += 1;
        let height = self.height_of(message);
        self.entries.push(Entry {
            handle,
            message: message.clone(),
            html: message_html(message),
            height,
        });
        handle
    }

    fn remove(&mut self, handle: MessageHandle) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.handle == handle) else {
            return false;
        };
        self.entries.remove(pos);
        self.clamp_scroll();
        true
    }

    fn scroll_to_bottom(&mut self) {
        // Browsers clamp scrollTop = scrollHeight to the maximum offset.
        self.scroll_top = self.max_scroll_top();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_remove() {
        let mut view = HtmlChatBox::default();
        let a = view.append(&Message::user("hi"));
        let b = view.append(&Message::loading());
        assert_eq!(view.len(), 2);
        assert_eq!(view.pending(), 1);

        assert!(view.remove(b));
        assert!(!view.remove(b));
        assert_eq!(view.pending(), 0);
        assert!(view.remove(a));
        assert!(view.is_empty());
    }

    #[test]
    fn test_scroll_height_grows_with_lines() {
        let mut view = HtmlChatBox::new(10);
        view.append(&Message::bot("one"));
        let single = view.scroll_height();
        view.append(&Message::bot("one\ntwo\nthree"));
        assert_eq!(view.scroll_height(), single + 24 + 3 * 20);
    }

    #[test]
    fn test_scroll_to_bottom_reaches_max() {
        let mut view = HtmlChatBox::new(100);
        for i in 0..10 {
            view.append(&Message::bot(format!("line {i}")));
        }
        assert_eq!(view.scroll_top(), 0);
        view.scroll_to_bottom();
        assert_eq!(view.scroll_top(), view.max_scroll_top());
        assert!(view.scroll_top() > 0);
    }

    #[test]
    fn test_to_html_wraps_children() {
        let mut view = HtmlChatBox::default();
        view.append(&Message::user("a"));
        assert_eq!(
            view.to_html(),
            r#"<div id="chat-box" class="chat-box"><div class="message user-message"><p>a</p></div></div>"#
        );
    }
}
