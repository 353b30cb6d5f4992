//! The widget controller talking to the real router over HTTP.

use async_trait::async_trait;
use music_chat::AppState;
use music_chat::recommender::Responder;
use music_chat::server::router;
use music_chat::widget::{
    ChatController, ChatView, HtmlChatBox, HttpTransport, Message, NETWORK_ERROR_TEXT, Sender,
    SubmitOutcome, WidgetError,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// Replies instantly, except to "slow", which waits until released.
#[derive(Debug, Default)]
struct GatedResponder {
    received_slow: Notify,
    release_slow: Notify,
}

#[async_trait]
impl Responder for GatedResponder {
    async fn respond(&self, message: &str) -> anyhow::Result<String> {
        match message {
            "slow" => {
                self.received_slow.notify_one();
                self.release_slow.notified().await;
                Ok("slow reply".into())
            }
            "boom" => anyhow::bail!("generation failed"),
            other => Ok(format!("echo: {other}\nsecond line")),
        }
    }
}

async fn spawn_server(responder: Arc<GatedResponder>) -> String {
    let static_dir = std::env::temp_dir();
    let app = router(AppState { responder }, &static_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn controller(base: &str) -> ChatController<HtmlChatBox, HttpTransport> {
    ChatController::new(HtmlChatBox::new(120), HttpTransport::new(base).unwrap())
}

fn snapshot(c: &ChatController<HtmlChatBox, HttpTransport>) -> Vec<Message> {
    c.view().lock().unwrap().messages().cloned().collect()
}

async fn send(c: &ChatController<HtmlChatBox, HttpTransport>, text: &str) -> SubmitOutcome {
    c.view().lock().unwrap().set_input(text);
    c.submit().await
}

#[tokio::test]
async fn test_round_trip_renders_reply() {
    let base = spawn_server(Arc::new(GatedResponder::default())).await;
    let c = controller(&base);

    let outcome = send(&c, "hello").await;
    assert!(matches!(outcome, SubmitOutcome::Answered), "{outcome:?}");

    let messages = snapshot(&c);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::user("hello"));
    assert_eq!(messages[1], Message::bot("echo: hello\nsecond line"));

    let view = c.view().lock().unwrap();
    assert!(view.input_text().is_empty());
    assert!(view.to_html().contains("<p>echo: hello<br>second line</p>"));
    assert_eq!(view.scroll_top(), view.max_scroll_top());
}

#[tokio::test]
async fn test_server_error_shows_network_fallback() {
    let base = spawn_server(Arc::new(GatedResponder::default())).await;
    let c = controller(&base);

    let outcome = send(&c, "boom").await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(WidgetError::Status { status: 500 })
    ));

    let messages = snapshot(&c);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], Message::bot(NETWORK_ERROR_TEXT));
}

#[tokio::test]
async fn test_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = controller(&format!("http://{addr}"));
    let outcome = send(&c, "anyone there?").await;

    assert!(matches!(outcome, SubmitOutcome::Failed(WidgetError::Transport(_))));
    let messages = snapshot(&c);
    assert_eq!(messages.last(), Some(&Message::bot(NETWORK_ERROR_TEXT)));
    assert!(messages.iter().all(|m| !m.loading));
}

#[tokio::test]
async fn test_overlapping_submissions_are_independent() {
    let responder = Arc::new(GatedResponder::default());
    let base = spawn_server(responder.clone()).await;
    let c = controller(&base);

    c.view().lock().unwrap().set_input("slow");
    let first = tokio::spawn({
        let c = c.clone();
        async move { c.submit().await }
    });
    responder.received_slow.notified().await;

    // Second submission while the first is still waiting.
    let outcome = send(&c, "fast").await;
    assert!(matches!(outcome, SubmitOutcome::Answered));
    {
        let view = c.view().lock().unwrap();
        assert_eq!(view.pending(), 1);
        let senders: Vec<Sender> = view.messages().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
    }

    responder.release_slow.notify_one();
    let outcome = first.await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Answered));

    let texts: Vec<String> = snapshot(&c).into_iter().map(|m| m.text).collect();
    assert_eq!(
        texts,
        vec!["slow", "fast", "echo: fast\nsecond line", "slow reply"]
    );
    assert_eq!(c.view().lock().unwrap().pending(), 0);
}
