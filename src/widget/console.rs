//! Terminal rendering of the chat box for the `chat` subcommand.

use std::io::Write;

use super::message::{Message, MessageHandle, Sender};
use super::view::ChatView;

const CLEAR_LINE: &str = "\r\x1b[2K";

/// Writes messages to a terminal as they are appended.
///
/// A terminal cannot delete arbitrary earlier lines, so only the most recent
/// line (the loading indicator) is erased on removal. That is sufficient for
/// the sequential prompt loop of the CLI.
#[derive(Debug)]
pub struct ConsoleView<W> {
    out: W,
    input: String,
    next_handle: u64,
    loading_line: Option<MessageHandle>,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            input: String::new(),
            next_handle: 0,
            loading_line: None,
        }
    }

    /// Line read from the prompt, to be picked up by the next submit.
    pub fn set_input(&mut self, line: impl Into<String>) {
        self.input = line.into();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, s: &str) {
        // A closed terminal leaves nothing to render to.
        if let Err(e) = self.out.write_all(s.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "Console write failed");
        }
    }
}

impl<W: Write + Send> ChatView for ConsoleView<W> {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append(&mut self, message: &Message) -> MessageHandle {
        let handle = MessageHandle(self.next_handle);
        self.next_handle += 1;

        if message.loading {
            self.write("bot> ...");
            self.loading_line = Some(handle);
            return handle;
        }

        let prefix = match message.sender {
            Sender::User => "you> ",
            Sender::Bot => "bot> ",
        };
        let indent = " ".repeat(prefix.len());
        let body = message.text.replace('\n', &format!("\n{indent}"));
        self.write(&format!("{prefix}{body}\n"));
        handle
    }

    fn remove(&mut self, handle: MessageHandle) -> bool {
        if self.loading_line == Some(handle) {
            self.loading_line = None;
            self.write(CLEAR_LINE);
            true
        } else {
            false
        }
    }

    fn scroll_to_bottom(&mut self) {}
}
