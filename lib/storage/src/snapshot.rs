// Embedding index snapshots, so restarts with an unchanged corpus skip encoding
use anyhow::{anyhow, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::Utc;
use estately_core::{Corpus, EmbeddingIndex, Vector};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk form of an index
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotData {
    pub fingerprint: String,
    pub model: String,
    pub dim: usize,
    pub created_at: String,
    pub vectors: Vec<Vec<f32>>,
}

/// What was written, for logging
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDescription {
    pub path: PathBuf,
    pub fingerprint: String,
    pub count: usize,
    pub size: u64,
    pub created_at: String,
}

/// One snapshot file per model inside a cache directory
pub struct IndexSnapshot {
    path: PathBuf,
}

impl IndexSnapshot {
    pub fn new<P: AsRef<Path>>(cache_dir: P, model: &str) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        fs::create_dir_all(cache_dir)?;
        Ok(Self {
            path: cache_dir.join(Self::file_name(model)),
        })
    }

    fn file_name(model: &str) -> String {
        let safe: String = model
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        format!("index-{}.snapshot", safe)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA-256 over the model identity and every composite text in corpus order.
    ///
    /// Any change to a listing, to the order, or to the model changes it.
    pub fn fingerprint(corpus: &Corpus, model: &str, dim: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update((dim as u64).to_le_bytes());
        hasher.update((corpus.len() as u64).to_le_bytes());
        for text in corpus.iter().map(|listing| listing.composite_text()) {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Write the index atomically, replacing any previous snapshot.
    pub fn save(&self, index: &EmbeddingIndex, fingerprint: &str) -> Result<SnapshotDescription> {
        let data = SnapshotData {
            fingerprint: fingerprint.to_string(),
            model: index.model().to_string(),
            dim: index.dim(),
            created_at: Utc::now().to_rfc3339(),
            vectors: index.vectors().iter().map(|v| v.as_slice().to_vec()).collect(),
        };
        let payload = bincode::serialize(&data)
            .map_err(|e| anyhow!("Serialization error: {}", e))?;

        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|file| {
                let mut encoder = GzEncoder::new(file, Compression::fast());
                encoder.write_all(&payload)?;
                encoder.finish().map(|_| ())
            })
            .map_err(|e| anyhow!("Failed to write {}: {}", self.path.display(), e))?;

        let size = fs::metadata(&self.path)?.len();
        info!(
            "Saved index snapshot {} ({} vectors, {} bytes)",
            self.path.display(),
            data.vectors.len(),
            size
        );

        Ok(SnapshotDescription {
            path: self.path.clone(),
            fingerprint: data.fingerprint,
            count: data.vectors.len(),
            size,
            created_at: data.created_at,
        })
    }

    /// Read the raw snapshot, if one exists.
    pub fn read(&self) -> Result<Option<SnapshotData>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut payload = Vec::new();
        decoder.read_to_end(&mut payload)?;

        let data: SnapshotData = bincode::deserialize(&payload)
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;
        Ok(Some(data))
    }

    /// Restore the index if the snapshot was built from exactly this corpus
    /// and model. A missing or stale snapshot yields `None`; an unreadable
    /// one is an error.
    pub fn load(
        &self,
        fingerprint: &str,
        corpus: &Corpus,
        dim: usize,
    ) -> Result<Option<EmbeddingIndex>> {
        let data = match self.read()? {
            Some(data) => data,
            None => return Ok(None),
        };

        if data.fingerprint != fingerprint
            || data.dim != dim
            || data.vectors.len() != corpus.len()
        {
            info!("Index snapshot {} is stale", self.path.display());
            return Ok(None);
        }

        let vectors = data.vectors.into_iter().map(Vector::new).collect();
        let index = EmbeddingIndex::from_vectors(vectors, data.dim, data.model)?;
        index.check_alignment(corpus)?;

        info!(
            "Restored {} embeddings from snapshot created {}",
            index.len(),
            data.created_at
        );
        Ok(Some(index))
    }
}
