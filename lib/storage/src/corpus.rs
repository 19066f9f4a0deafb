use estately_core::{Corpus, Error, Listing, Result};
use std::path::Path;
use tracing::info;

/// A corpus read from disk, with how many duplicate titles were dropped
#[derive(Debug)]
pub struct LoadedCorpus {
    pub corpus: Corpus,
    pub total: usize,
    pub duplicates_removed: usize,
}

/// Parse a JSON array of listings and drop repeated titles (first one wins).
pub fn parse_corpus(json: &[u8]) -> Result<LoadedCorpus> {
    let listings: Vec<Listing> = serde_json::from_slice(json)
        .map_err(|e| Error::Storage(format!("malformed listing data: {}", e)))?;
    let total = listings.len();
    let (corpus, duplicates_removed) = Corpus::deduplicated(listings);

    Ok(LoadedCorpus {
        corpus,
        total,
        duplicates_removed,
    })
}

/// Load the listing corpus from a JSON file.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<LoadedCorpus> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::Storage(format!("cannot read {}: {}", path.display(), e)))?;
    let loaded = parse_corpus(&data)?;

    info!(
        "Loaded {} unique listings (removed {} duplicates) from {}",
        loaded.corpus.len(),
        loaded.duplicates_removed,
        path.display()
    );
    Ok(loaded)
}
