//! Deterministic hashing embedder.
//!
//! Maps character trigrams and whole words into a fixed number of buckets
//! and normalizes the result. It captures lexical overlap, not meaning, but
//! needs no model download, which makes it the backend for tests and
//! offline runs.

use estately_core::{Embedder, Error, Result, Vector};
use std::collections::HashSet;

/// Matches the output size of all-MiniLM-L6-v2
pub const DEFAULT_HASH_DIM: usize = 384;

const TRIGRAM_WEIGHT: f32 = 1.0;
const WORD_WEIGHT: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    name: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "hash embedder dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            dim,
            name: format!("hash-{}", dim),
        })
    }

    fn bucket(&self, token: &str) -> usize {
        (fnv1a(token.as_bytes()) % self.dim as u64) as usize
    }

    fn embed(&self, text: &str) -> Vector {
        let mut data = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        for trigram in trigrams(&normalized) {
            data[self.bucket(&trigram)] += TRIGRAM_WEIGHT;
        }
        for word in normalized.split_whitespace() {
            data[self.bucket(word)] += WORD_WEIGHT;
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASH_DIM,
            name: format!("hash-{}", DEFAULT_HASH_DIM),
        }
    }
}

impl Embedder for HashEmbedder {
    fn encode(&self, text: &str) -> Result<Vector> {
        Ok(self.embed(text))
    }

    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Padded character trigrams
fn trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();
    chars.windows(3).map(|w| w.iter().collect()).collect()
}

/// 64-bit FNV-1a; stable across toolchains so persisted indices stay valid
#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}
