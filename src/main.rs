//! Music recommendation chat: server and terminal client.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};

use music_chat::config::{AppConfig, ChatArgs, Cli, Command};
use music_chat::telemetry;
use music_chat::widget::{ChatController, ConsoleView, HttpTransport, SubmitOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            telemetry::init();
            let config = match AppConfig::load(&args) {
                Ok(c) => Arc::new(c),
                Err(e) => {
                    eprintln!("Configuration error: {e}");
                    std::process::exit(1);
                }
            };
            music_chat::server::start_server(config).await
        }
        Command::Chat(args) => {
            telemetry::init_client();
            run_chat(&args).await
        }
    }
}

/// Prompt loop: every line is one submit of the chat form.
async fn run_chat(args: &ChatArgs) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&args.server)?;
    println!("Connected to {} (Ctrl-D or /quit to exit)", transport.endpoint());

    let controller = ChatController::new(ConsoleView::stdout(), transport);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        controller
            .view()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .set_input(line);

        if let SubmitOutcome::Failed(e) = controller.submit().await {
            tracing::warn!(error = %e, "Message not delivered");
        }
    }
    Ok(())
}
