//! Music recommendation chat.
//!
//! A chat page posts questions to `/chat`; the server retrieves songs with
//! similar descriptions from a catalog and asks an LLM to recommend among
//! them.
//!
//! # Modules
//!
//! - [`widget`]: chat form controller, message rendering, views and transport
//! - [`server`]: Axum router serving the page and `POST /chat`
//! - [`recommender`]: catalog, embeddings, vector index and RAG chatbot
//! - [`llm`]: OpenAI-compatible chat completions client
//! - [`config`]: CLI and layered configuration
//! - [`telemetry`]: tracing setup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod llm;
pub mod recommender;
pub mod server;
pub mod telemetry;
pub mod widget;

use recommender::Responder;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Produces the answer for each chat message.
    pub responder: Arc<dyn Responder>,
}
