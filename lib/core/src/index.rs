use crate::{Corpus, Embedder, Error, Result, Vector};
use rayon::prelude::*;
use tracing::{info, warn};

/// Below this many vectors scoring stays on the calling thread.
const PARALLEL_SCORING_THRESHOLD: usize = 2048;

/// One embedding per listing, aligned 1:1 with the corpus by position.
///
/// Built once during startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    vectors: Vec<Vector>,
    dim: usize,
    model: String,
}

impl EmbeddingIndex {
    /// Encode every listing's composite text in a single batch.
    ///
    /// Fails if the model errors or returns a misaligned or ragged result;
    /// there is no partial index.
    pub fn build(corpus: &Corpus, embedder: &dyn Embedder) -> Result<Self> {
        if corpus.is_empty() {
            warn!("Building embedding index for an empty corpus");
            return Ok(Self {
                vectors: Vec::new(),
                dim: embedder.dimension(),
                model: embedder.name().to_string(),
            });
        }

        info!(
            "Precomputing {} listing embeddings with {}",
            corpus.len(),
            embedder.name()
        );
        let texts = corpus.composite_texts();
        let vectors = embedder.encode_batch(&texts)?;

        let index = Self::from_vectors(vectors, embedder.dimension(), embedder.name())?;
        index.check_alignment(corpus)?;

        info!("Embedding index ready ({} x {})", index.len(), index.dim());
        Ok(index)
    }

    /// Restore an index from raw vectors, validating uniform dimensionality.
    pub fn from_vectors(
        vectors: Vec<Vector>,
        dim: usize,
        model: impl Into<String>,
    ) -> Result<Self> {
        if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }

        Ok(Self {
            vectors,
            dim,
            model: model.into(),
        })
    }

    /// Check `len(index) == len(corpus)`.
    pub fn check_alignment(&self, corpus: &Corpus) -> Result<()> {
        if self.vectors.len() != corpus.len() {
            return Err(Error::IndexMisaligned {
                expected: corpus.len(),
                actual: self.vectors.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&Vector> {
        self.vectors.get(position)
    }

    pub fn vectors(&self) -> &[Vector] {
        &self.vectors
    }

    /// Cosine similarity of `query` against every vector, in corpus order.
    pub fn scores(&self, query: &Vector) -> Result<Vec<f32>> {
        if query.dim() != self.dim {
            return Err(Error::InvalidDimension {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let scores = if self.vectors.len() >= PARALLEL_SCORING_THRESHOLD {
            self.vectors
                .par_iter()
                .map(|v| v.cosine_similarity(query))
                .collect()
        } else {
            self.vectors
                .iter()
                .map(|v| v.cosine_similarity(query))
                .collect()
        };
        Ok(scores)
    }
}
