use crate::corpus::load_corpus;
use crate::snapshot::IndexSnapshot;
use estately_core::{
    Corpus, Embedder, EmbeddingIndex, Error, HybridResolver, ResolverConfig, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything needed to bring the catalog up
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub data_file: PathBuf,
    /// Snapshot directory; `None` always rebuilds the index
    pub index_cache_dir: Option<PathBuf>,
    pub resolver: ResolverConfig,
}

impl CatalogOptions {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            index_cache_dir: None,
            resolver: ResolverConfig::default(),
        }
    }

    #[must_use]
    pub fn with_index_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_cache_dir = Some(dir.into());
        self
    }
}

/// Where the live index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Built,
    Snapshot,
}

/// Owns the initialization phase: corpus, index and resolver are created
/// here once and only handed out as shared read-only references.
pub struct CatalogManager {
    resolver: Arc<HybridResolver>,
    index_source: IndexSource,
    duplicates_removed: usize,
}

impl CatalogManager {
    /// Load the corpus file, then restore or build the index.
    pub fn open(options: CatalogOptions, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let loaded = load_corpus(&options.data_file)?;
        let mut manager = Self::from_corpus(loaded.corpus, embedder, &options)?;
        manager.duplicates_removed = loaded.duplicates_removed;
        Ok(manager)
    }

    /// Build the catalog from an already loaded corpus.
    pub fn from_corpus(
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
        options: &CatalogOptions,
    ) -> Result<Self> {
        let (index, index_source) = match &options.index_cache_dir {
            Some(dir) => Self::cached_index(&corpus, embedder.as_ref(), dir)?,
            None => (EmbeddingIndex::build(&corpus, embedder.as_ref())?, IndexSource::Built),
        };

        let resolver = HybridResolver::new(
            Arc::new(corpus),
            Arc::new(index),
            embedder,
            options.resolver.clone(),
        )?;
        info!("Catalog ready: {:?}", resolver);

        Ok(Self {
            resolver: Arc::new(resolver),
            index_source,
            duplicates_removed: 0,
        })
    }

    fn cached_index(
        corpus: &Corpus,
        embedder: &dyn Embedder,
        dir: &Path,
    ) -> Result<(EmbeddingIndex, IndexSource)> {
        let snapshot = IndexSnapshot::new(dir, embedder.name())
            .map_err(|e| Error::Persistence(e.to_string()))?;
        let fingerprint = IndexSnapshot::fingerprint(corpus, embedder.name(), embedder.dimension());

        match snapshot.load(&fingerprint, corpus, embedder.dimension()) {
            Ok(Some(index)) => return Ok((index, IndexSource::Snapshot)),
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable snapshot {}: {}", snapshot.path().display(), e),
        }

        let index = EmbeddingIndex::build(corpus, embedder)?;
        if let Err(e) = snapshot.save(&index, &fingerprint) {
            warn!("Could not save index snapshot: {}", e);
        }
        Ok((index, IndexSource::Built))
    }

    pub fn resolver(&self) -> Arc<HybridResolver> {
        self.resolver.clone()
    }

    pub fn index_source(&self) -> IndexSource {
        self.index_source
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estately_core::Listing;
    use estately_embed::HashEmbedder;
    use tempfile::tempdir;

    fn write_corpus(dir: &std::path::Path) -> PathBuf {
        let listings = vec![
            Listing::new("Ocean Terrace", "Lekki, Lagos").with_price(120_000_000),
            Listing::new("Hilltop Villa", "Asokoro, Abuja").with_price(300_000_000),
            Listing::new("Ocean Terrace", "Lekki, Lagos").with_price(1),
        ];
        let path = dir.join("properties.json");
        std::fs::write(&path, serde_json::to_vec(&listings).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_open_without_cache_builds() {
        let dir = tempdir().unwrap();
        let data_file = write_corpus(dir.path());
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32).unwrap());

        let manager = CatalogManager::open(CatalogOptions::new(data_file), embedder).unwrap();
        assert_eq!(manager.index_source(), IndexSource::Built);
        assert_eq!(manager.duplicates_removed(), 1);
        assert_eq!(manager.resolver().corpus().len(), 2);
        assert_eq!(manager.resolver().index().len(), 2);
    }

    #[test]
    fn test_second_open_uses_snapshot() {
        let dir = tempdir().unwrap();
        let data_file = write_corpus(dir.path());
        let options = CatalogOptions::new(data_file).with_index_cache_dir(dir.path().join("cache"));
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32).unwrap());

        let first = CatalogManager::open(options.clone(), embedder.clone()).unwrap();
        assert_eq!(first.index_source(), IndexSource::Built);

        let second = CatalogManager::open(options, embedder).unwrap();
        assert_eq!(second.index_source(), IndexSource::Snapshot);
        assert_eq!(
            first.resolver().index().vectors(),
            second.resolver().index().vectors()
        );
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(8).unwrap());
        let err = CatalogManager::open(CatalogOptions::new("/no/such/file.json"), embedder)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Storage(_)));
    }
}
