pub mod corpus;
pub mod manager;
pub mod snapshot;

pub use corpus::{load_corpus, parse_corpus, LoadedCorpus};
pub use manager::{CatalogManager, CatalogOptions, IndexSource};
pub use snapshot::{IndexSnapshot, SnapshotData, SnapshotDescription};
