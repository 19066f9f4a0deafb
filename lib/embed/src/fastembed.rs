//! Pretrained sentence-embedding models run locally through `fastembed`.
//!
//! The model files are downloaded into the cache directory on first use and
//! loaded once. `TextEmbedding` needs exclusive access while encoding, so the
//! model sits behind a mutex and concurrent encodes serialize on it.

use estately_core::{Embedder, Error, Result, Vector};
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_MODEL: &str = "all-minilm-l6-v2";

fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" | "all-MiniLM-L6-v2" | "AllMiniLML6V2" => {
            Ok(fastembed::EmbeddingModel::AllMiniLML6V2)
        }
        "bge-small-en-v1.5" | "BGESmallENV15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" | "BGEBaseENV15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        other => Err(Error::ModelLoad(format!(
            "unknown embedding model '{}' (supported: all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5)",
            other
        ))),
    }
}

pub struct FastEmbedder {
    model: Mutex<fastembed::TextEmbedding>,
    dim: usize,
    name: String,
}

impl FastEmbedder {
    /// Load a model, downloading it into `cache_dir` if needed.
    pub fn new(model_name: &str, cache_dir: Option<PathBuf>) -> Result<Self> {
        let model = resolve_model(model_name)?;

        let mut options = fastembed::InitOptions::new(model).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let mut text_embedding = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| Error::ModelLoad(format!("failed to load {}: {}", model_name, e)))?;

        let probe = text_embedding
            .embed(vec!["dimension probe"], None)
            .map_err(|e| Error::ModelLoad(format!("failed to probe {}: {}", model_name, e)))?;
        let dim = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::ModelLoad("empty probe embedding".to_string()))?;

        info!("Loaded embedding model {} ({} dims)", model_name, dim);
        Ok(Self {
            model: Mutex::new(text_embedding),
            dim,
            name: model_name.to_string(),
        })
    }

    fn check(&self, data: Vec<f32>) -> Result<Vector> {
        if data.len() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: data.len(),
            });
        }
        Ok(Vector::new(data))
    }
}

impl Embedder for FastEmbedder {
    fn encode(&self, text: &str) -> Result<Vector> {
        let mut model = self.model.lock();
        let mut output = model
            .embed(vec![text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        drop(model);

        let data = output
            .pop()
            .ok_or_else(|| Error::Embedding("model returned no embedding".to_string()))?;
        self.check(data)
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut model = self.model.lock();
        let output = model
            .embed(texts.to_vec(), None)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        drop(model);

        output.into_iter().map(|data| self.check(data)).collect()
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model", &self.name)
            .field("dim", &self.dim)
            .finish()
    }
}
