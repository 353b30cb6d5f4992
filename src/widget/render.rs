//! HTML markup for chat box entries.

use super::message::Message;

/// Inner markup of the loading animation (three pulsing dots).
pub const LOADING_DOTS: &str = "<span></span><span></span><span></span>";

/// Escape text for insertion as HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Message text as paragraph markup: escaped, with `\n` turned into `<br>`.
pub fn text_to_html(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Full markup of one chat box entry.
///
/// ```rust
/// use music_chat::widget::{Message, render::message_html};
///
/// assert_eq!(
///     message_html(&Message::bot("a\nb")),
///     r#"<div class="message bot-message"><p>a<br>b</p></div>"#
/// );
/// ```
pub fn message_html(message: &Message) -> String {
    let class = message.sender.css_class();
    if message.loading {
        format!(r#"<div class="message {class}"><p class="loading">{LOADING_DOTS}</p></div>"#)
    } else {
        format!(
            r#"<div class="message {class}"><p>{}</p></div>"#,
            text_to_html(&message.text)
        )
    }
}
