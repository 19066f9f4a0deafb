//! # Estately
//!
//! Hybrid search over a catalog of real-estate listings.
//!
//! Every listing is embedded once at startup. A search query first tries a
//! plain case-insensitive substring match over title, location and
//! description; when that finds at least three listings they are returned in
//! catalog order, otherwise the query is embedded and the closest listings by
//! cosine similarity are returned. A chat message always takes the semantic
//! path and yields the top three.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! estately --data-file data/properties.json --http-port 5000
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use estately::prelude::*;
//!
//! let embedder = load_embedder(&EmbedderSpec::new("hash"))?;
//! let catalog = CatalogManager::open(CatalogOptions::new("data/properties.json"), embedder)?;
//! let resolver = catalog.resolver();
//!
//! let outcome = resolver.search("waterfront", 5)?;
//! for listing in resolver.listings(&outcome) {
//!     println!("{} in {}", listing.title, listing.location);
//! }
//! # Ok::<(), estately::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - [`estately-core`](https://docs.rs/estately-core) - Listings, embedding index, top-k selection, hybrid resolver
//! - [`estately-embed`](https://docs.rs/estately-embed) - Text embedders (hashing, optional fastembed models)
//! - [`estately-storage`](https://docs.rs/estately-storage) - Corpus loading and index snapshots
//! - [`estately-api`](https://docs.rs/estately-api) - HTTP endpoints

// Re-export core types
pub use estately_core::{
    rank_top_k, select_top_k, Corpus, Embedder, EmbeddingIndex, Error, Hit, HybridResolver,
    KeywordQuery, Listing, Measure, ResolverConfig, Result, SearchOutcome, SemanticOrder,
    Strategy, Vector,
};

// Re-export embedders
pub use estately_embed::{load_embedder, EmbedderSpec, HashEmbedder, DEFAULT_MODEL};

// Re-export storage
pub use estately_storage::{load_corpus, CatalogManager, CatalogOptions, IndexSource};

// Re-export API
pub use estately_api::{ApiConfig, ChatReply, PropertyCard, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_embedder, CatalogManager, CatalogOptions, Corpus, EmbedderSpec, Error,
        HybridResolver, Listing, ResolverConfig, Result, SearchOutcome, Strategy,
    };
}
