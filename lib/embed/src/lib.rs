//! # Estately Embed
//!
//! Concrete [`Embedder`](estately_core::Embedder) implementations.
//!
//! - [`HashEmbedder`] - deterministic trigram hashing, always available
//! - `FastEmbedder` - pretrained local models (feature `fastembed`)
//!
//! [`load_embedder`] picks one from a model name: `hash` or `hash:<dim>`
//! selects the hashing embedder, anything else is a pretrained model name.

pub mod hash;
#[cfg(feature = "fastembed")]
pub mod fastembed;

pub use hash::{HashEmbedder, DEFAULT_HASH_DIM};
#[cfg(feature = "fastembed")]
pub use crate::fastembed::FastEmbedder;

use estately_core::{Embedder, Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Model used when none is configured
#[cfg(feature = "fastembed")]
pub const DEFAULT_MODEL: &str = crate::fastembed::DEFAULT_MODEL;
#[cfg(not(feature = "fastembed"))]
pub const DEFAULT_MODEL: &str = "hash";

/// Which embedder to load and where it may cache model files
#[derive(Debug, Clone)]
pub struct EmbedderSpec {
    pub model: String,
    pub cache_dir: Option<PathBuf>,
}

impl EmbedderSpec {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            cache_dir: None,
        }
    }

    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}

impl Default for EmbedderSpec {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

/// Load the embedder named by `spec`. Failure here is fatal for startup.
pub fn load_embedder(spec: &EmbedderSpec) -> Result<Arc<dyn Embedder>> {
    let model = spec.model.trim();

    let hash_dim = if model == "hash" {
        Some(DEFAULT_HASH_DIM)
    } else if let Some(dim) = model.strip_prefix("hash:") {
        let dim = dim
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid hash dimension '{}'", dim)))?;
        Some(dim)
    } else {
        None
    };

    if let Some(dim) = hash_dim {
        let embedder = HashEmbedder::new(dim)?;
        info!("Using hashing embedder {} (lexical similarity only)", embedder.name());
        return Ok(Arc::new(embedder));
    }

    load_pretrained(model, spec.cache_dir.clone())
}

#[cfg(feature = "fastembed")]
fn load_pretrained(model: &str, cache_dir: Option<PathBuf>) -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(FastEmbedder::new(model, cache_dir)?))
}

#[cfg(not(feature = "fastembed"))]
fn load_pretrained(model: &str, _cache_dir: Option<PathBuf>) -> Result<Arc<dyn Embedder>> {
    Err(Error::ModelLoad(format!(
        "model '{}' needs the `fastembed` feature; use `hash` for the built-in embedder",
        model
    )))
}
