//! Song recommendation via retrieval-augmented generation.
//!
//! # Pipeline
//!
//! 1. [`catalog`]: songs loaded from a CSV music database
//! 2. [`embedding`]: descriptions and questions turned into vectors
//! 3. [`index`]: exact L2 search over the description vectors, cached on disk
//! 4. [`prompt`]: retrieved songs formatted into the model prompt
//! 5. [`chatbot`]: ties the steps together behind [`Responder`]

pub mod catalog;
pub mod chatbot;
pub mod embedding;
pub mod index;
pub mod prompt;

pub use catalog::{Catalog, CatalogError, Song};
pub use chatbot::RagChatbot;
pub use embedding::{Embedder, FastEmbedder};
pub use index::{FlatIndex, IndexError, Neighbor};

use async_trait::async_trait;

/// Answers one chat message. This is what `POST /chat` calls.
#[async_trait]
pub trait Responder: Send + Sync + std::fmt::Debug {
    async fn respond(&self, message: &str) -> anyhow::Result<String>;
}
