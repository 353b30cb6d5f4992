//! Retrieval-augmented recommendation: retrieve similar songs, then ask the
//! model with those songs as context.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use super::Responder;
use super::catalog::{Catalog, Song};
use super::embedding::Embedder;
use super::index::FlatIndex;
use super::prompt::build_prompt;
use crate::llm::TextGenerator;

/// Catalog, index and model clients, shared read-only by all requests.
#[derive(Debug)]
pub struct RagChatbot {
    catalog: Catalog,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    top_k: usize,
}

impl RagChatbot {
    /// Load the index from `index_path` when it matches the catalog,
    /// otherwise embed every description, build the index and save it.
    pub async fn bootstrap(
        catalog: Catalog,
        index_path: &Path,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        top_k: usize,
    ) -> Result<Self> {
        let index = match FlatIndex::load(index_path).await {
            Ok(index) if index.len() == catalog.len() => {
                info!(path = %index_path.display(), rows = index.len(), "Loaded saved index");
                Some(index)
            }
            Ok(index) => {
                warn!(
                    path = %index_path.display(),
                    index_rows = index.len(),
                    catalog_rows = catalog.len(),
                    "Saved index does not match catalog, rebuilding"
                );
                None
            }
            Err(e) if index_path.exists() => {
                warn!(path = %index_path.display(), error = %e, "Saved index unreadable, rebuilding");
                None
            }
            Err(_) => None,
        };

        let index = match index {
            Some(index) => index,
            None => {
                info!(rows = catalog.len(), "Building index (this may take a while)...");
                let embeddings = embedder
                    .embed_documents(catalog.descriptions())
                    .await
                    .context("Failed to embed catalog descriptions")?;
                let index = FlatIndex::from_vectors(embeddings)?;
                index
                    .save(index_path)
                    .await
                    .with_context(|| format!("Failed to save index to {}", index_path.display()))?;
                info!(path = %index_path.display(), "Index built and saved");
                index
            }
        };

        Ok(Self::new(catalog, index, embedder, generator, top_k))
    }

    /// Assemble from parts that are already in memory.
    pub fn new(
        catalog: Catalog,
        index: FlatIndex,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
        top_k: usize,
    ) -> Self {
        Self {
            catalog,
            index,
            embedder,
            generator,
            top_k,
        }
    }

    /// Songs most similar to `query`, closest first.
    pub async fn search(&self, query: &str) -> Result<Vec<&Song>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&query_embedding, self.top_k)?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| self.catalog.get(hit.row))
            .collect())
    }

    pub async fn generate_response(&self, query: &str) -> Result<String> {
        let songs = self.search(query).await?;
        tracing::debug!(
            retrieved = ?songs.iter().map(|s| s.song_title.as_str()).collect::<Vec<_>>(),
            "Retrieved songs"
        );
        let prompt = build_prompt(query, &songs);
        self.generator.generate(&prompt).await
    }
}

#[async_trait]
impl Responder for RagChatbot {
    async fn respond(&self, message: &str) -> Result<String> {
        self.generate_response(message).await
    }
}
