//! # Estately Core
//!
//! Core library for the Estately listing search service.
//!
//! This crate provides the data model and the retrieval engine:
//!
//! - [`Listing`] / [`Corpus`] - Immutable listing records in a stable order
//! - [`Embedder`] - The text embedding model seam
//! - [`EmbeddingIndex`] - One vector per listing, aligned with the corpus
//! - [`KeywordQuery`] - Case-insensitive substring matching
//! - [`select_top_k`] / [`rank_top_k`] - Partial top-k selection
//! - [`HybridResolver`] - Keyword-or-semantic search and top-3 chat
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use estately_core::{
//!     Corpus, Embedder, EmbeddingIndex, HybridResolver, Listing, ResolverConfig, Result, Vector,
//! };
//!
//! struct Lengths;
//!
//! impl Embedder for Lengths {
//!     fn encode(&self, text: &str) -> Result<Vector> {
//!         Ok(Vector::new(vec![text.len() as f32, 1.0]))
//!     }
//!     fn dimension(&self) -> usize { 2 }
//!     fn name(&self) -> &str { "lengths" }
//! }
//!
//! let corpus = Arc::new(Corpus::new(vec![
//!     Listing::new("Duplex", "Lekki, Lagos"),
//!     Listing::new("Bungalow", "Abuja"),
//! ]));
//! let embedder: Arc<dyn Embedder> = Arc::new(Lengths);
//! let index = Arc::new(EmbeddingIndex::build(&corpus, embedder.as_ref()).unwrap());
//! let resolver = HybridResolver::new(corpus, index, embedder, ResolverConfig::default()).unwrap();
//!
//! let outcome = resolver.search("lagos", 10).unwrap();
//! assert!(outcome.len() <= 2);
//! ```

pub mod embedder;
pub mod error;
pub mod index;
pub mod keyword;
pub mod listing;
pub mod resolver;
pub mod topk;
pub mod vector;

pub use embedder::Embedder;
pub use error::{Error, Result};
pub use index::EmbeddingIndex;
pub use keyword::KeywordQuery;
pub use listing::{Corpus, Listing, Measure, SearchKeys, UNKNOWN_MEASURE};
pub use resolver::{Hit, HybridResolver, ResolverConfig, SearchOutcome, SemanticOrder, Strategy};
pub use topk::{rank_top_k, select_top_k};
pub use vector::Vector;
