use crate::{Result, Vector};

/// A text embedding model treated as a pure function `text -> vector`.
///
/// Implementations are loaded once and shared read-only. Encoding is a
/// blocking call; callers on an async runtime should move it to a blocking
/// pool. Every vector an implementation returns has length [`dimension`].
///
/// [`dimension`]: Embedder::dimension
pub trait Embedder: Send + Sync {
    /// Encode a single text.
    fn encode(&self, text: &str) -> Result<Vector>;

    /// Encode many texts, one vector per input in the same order.
    ///
    /// Backends with native batching should override this.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }

    /// Output dimensionality.
    fn dimension(&self) -> usize;

    /// Model name, used for logging and index fingerprints.
    fn name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    fn encode(&self, text: &str) -> Result<Vector> {
        (**self).encode(text)
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        (**self).encode_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
