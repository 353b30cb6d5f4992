//! Sentence embeddings for catalog descriptions and user questions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Turns texts into fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embed catalog entries that will be searched.
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.embed(texts).await
    }

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .context("No embedding generated")
    }
}

/// Input markers some models were trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextPrefixes {
    pub query: &'static str,
    pub passage: &'static str,
}

impl TextPrefixes {
    /// E5 models expect `query: ` / `passage: `; the rest take raw text.
    #[must_use]
    pub fn for_model(name: &str) -> Self {
        if name.to_lowercase().contains("e5") {
            Self {
                query: "query: ",
                passage: "passage: ",
            }
        } else {
            Self::default()
        }
    }
}

fn with_prefix(prefix: &str, texts: Vec<String>) -> Vec<String> {
    if prefix.is_empty() {
        return texts;
    }
    texts.into_iter().map(|t| format!("{prefix}{t}")).collect()
}

/// Map a configured model name onto a fastembed model.
///
/// The catalog descriptions are not necessarily English, so the default is
/// multilingual.
pub fn model_from_name(name: &str) -> Result<EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "multilingual-e5-small" => Ok(EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(EmbeddingModel::MultilingualE5Base),
        "paraphrase-multilingual-mpnet-base-v2" => Ok(EmbeddingModel::ParaphraseMLMpnetBaseV2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        other => anyhow::bail!("Unsupported embedding model: {other}"),
    }
}

/// [`Embedder`] backed by a local ONNX model.
pub struct FastEmbedder {
    // fastembed needs `&mut` to embed; the model is moved into a blocking
    // task and put back afterwards.
    model: Arc<Mutex<Option<TextEmbedding>>>,
    model_name: String,
    prefixes: TextPrefixes,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model_name", &self.model_name)
            .field("prefixes", &self.prefixes)
            .finish_non_exhaustive()
    }
}

impl FastEmbedder {
    /// Load (downloading on first use) the named model.
    pub async fn load(model_name: &str) -> Result<Self> {
        let model = model_from_name(model_name)?;
        info!(model = %model_name, "Initializing fastembed model...");

        let text_embedding = tokio::task::spawn_blocking(move || {
            let mut options = InitOptions::new(model);
            options.show_download_progress = true;
            TextEmbedding::try_new(options)
        })
        .await??;

        Ok(Self {
            model: Arc::new(Mutex::new(Some(text_embedding))),
            model_name: model_name.to_string(),
            prefixes: TextPrefixes::for_model(model_name),
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut model_guard = self.model.lock().await;
        let mut owned_model = model_guard
            .take()
            .context("Embedding model unavailable after an earlier failure")?;

        let (embeddings_res, returned_model) = tokio::task::spawn_blocking(move || {
            let res = owned_model.embed(texts, None);
            (res, owned_model)
        })
        .await?;

        *model_guard = Some(returned_model);
        embeddings_res.map_err(|e| anyhow::anyhow!(e))
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.embed(with_prefix(self.prefixes.passage, texts)).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(with_prefix(self.prefixes.query, vec![text.to_string()]))
            .await?
            .into_iter()
            .next()
            .context("No embedding generated")
    }
}
