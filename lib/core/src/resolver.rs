//! Hybrid query resolution over a fixed corpus.
//!
//! Search picks between two strategies per query. If the normalized query
//! is a substring of at least `keyword_threshold` listings, the keyword
//! matches are returned in corpus order and the model is never called.
//! Otherwise the query is encoded and the top `limit` listings by cosine
//! similarity are returned. Chat always takes the semantic path.

use crate::topk::{rank_top_k, select_top_k};
use crate::{Corpus, EmbeddingIndex, Embedder, Error, KeywordQuery, Listing, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How a result set was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Empty query: head of the corpus
    Browse,
    /// Substring matches in corpus order
    Keyword,
    /// Top-k by embedding similarity
    Semantic,
}

/// Presentation order of the semantic top-k
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemanticOrder {
    /// Selected listings sorted by descending similarity
    #[default]
    Ranked,
    /// Whatever order partial selection leaves them in
    Selection,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Minimum keyword matches for the lexical path to win
    pub keyword_threshold: usize,
    /// Fixed result size for chat
    pub chat_k: usize,
    pub default_limit: usize,
    pub semantic_order: SemanticOrder,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            keyword_threshold: 3,
            chat_k: 3,
            default_limit: 10,
            semantic_order: SemanticOrder::Ranked,
        }
    }
}

/// A listing position in the corpus, with its similarity when ranked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub score: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The query as it was matched or encoded
    pub query: String,
    pub strategy: Strategy,
    pub hits: Vec<Hit>,
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.hits.iter().map(|hit| hit.position).collect()
    }
}

/// Read-only query engine over the corpus, its index and the model.
///
/// All three are shared and never mutated after construction, so a single
/// resolver can serve concurrent requests without locking.
pub struct HybridResolver {
    corpus: Arc<Corpus>,
    index: Arc<EmbeddingIndex>,
    embedder: Arc<dyn Embedder>,
    config: ResolverConfig,
}

impl HybridResolver {
    pub fn new(
        corpus: Arc<Corpus>,
        index: Arc<EmbeddingIndex>,
        embedder: Arc<dyn Embedder>,
        config: ResolverConfig,
    ) -> Result<Self> {
        index.check_alignment(&corpus)?;
        if index.dim() != embedder.dimension() {
            return Err(Error::InvalidDimension {
                expected: embedder.dimension(),
                actual: index.dim(),
            });
        }
        if config.keyword_threshold == 0 {
            return Err(Error::InvalidConfig(
                "keyword_threshold must be at least 1".to_string(),
            ));
        }
        if config.chat_k == 0 {
            return Err(Error::InvalidConfig("chat_k must be at least 1".to_string()));
        }

        Ok(Self {
            corpus,
            index,
            embedder,
            config,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The listing a hit refers to
    pub fn listing(&self, hit: &Hit) -> &Listing {
        &self.corpus.listings()[hit.position]
    }

    pub fn listings<'a>(
        &'a self,
        outcome: &'a SearchOutcome,
    ) -> impl Iterator<Item = &'a Listing> + 'a {
        outcome.hits.iter().map(move |hit| self.listing(hit))
    }

    /// First `limit` listings in corpus order
    pub fn browse(&self, limit: usize) -> SearchOutcome {
        SearchOutcome {
            query: String::new(),
            strategy: Strategy::Browse,
            hits: (0..limit.min(self.corpus.len()))
                .map(|position| Hit {
                    position,
                    score: None,
                })
                .collect(),
        }
    }

    /// Resolve a search query to at most `min(limit, corpus size)` listings.
    pub fn search(&self, query: &str, limit: usize) -> Result<SearchOutcome> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }

        let keyword = match KeywordQuery::parse(query) {
            Some(keyword) => keyword,
            None => return Ok(self.browse(limit)),
        };

        let matches = keyword.matching_positions(&self.corpus);
        if matches.len() >= self.config.keyword_threshold {
            debug!(
                query = keyword.as_str(),
                matches = matches.len(),
                "keyword path"
            );
            return Ok(SearchOutcome {
                query: keyword.to_string(),
                strategy: Strategy::Keyword,
                hits: matches
                    .into_iter()
                    .take(limit)
                    .map(|position| Hit {
                        position,
                        score: None,
                    })
                    .collect(),
            });
        }

        debug!(
            query = keyword.as_str(),
            matches = matches.len(),
            "semantic path"
        );
        let hits = self.semantic_top_k(keyword.as_str(), limit)?;
        Ok(SearchOutcome {
            query: keyword.to_string(),
            strategy: Strategy::Semantic,
            hits,
        })
    }

    /// Semantic top-`chat_k` for a chat message, regardless of keyword hits.
    ///
    /// The message is trimmed but keeps its case. A blank message is an
    /// [`Error::EmptyInput`].
    pub fn chat(&self, message: &str) -> Result<SearchOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::EmptyInput("No message provided".to_string()));
        }

        let hits = self.semantic_top_k(message, self.config.chat_k)?;
        debug!(message, results = hits.len(), "chat");
        Ok(SearchOutcome {
            query: message.to_string(),
            strategy: Strategy::Semantic,
            hits,
        })
    }

    fn semantic_top_k(&self, text: &str, limit: usize) -> Result<Vec<Hit>> {
        let k = limit.min(self.corpus.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.encode(text)?;
        let scores = self.index.scores(&query)?;
        let positions = match self.config.semantic_order {
            SemanticOrder::Ranked => rank_top_k(&scores, k),
            SemanticOrder::Selection => select_top_k(&scores, k),
        };

        Ok(positions
            .into_iter()
            .map(|position| Hit {
                position,
                score: Some(scores[position]),
            })
            .collect())
    }
}

impl std::fmt::Debug for HybridResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridResolver")
            .field("listings", &self.corpus.len())
            .field("dim", &self.index.dim())
            .field("model", &self.embedder.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use parking_lot::Mutex;

    /// One axis per known word; records every text it encodes
    struct AxisEmbedder {
        axes: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl AxisEmbedder {
        fn new(axes: Vec<&'static str>) -> Self {
            Self {
                axes,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn query_calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn embed(&self, text: &str) -> Vector {
            let lower = text.to_lowercase();
            let mut data: Vec<f32> = self
                .axes
                .iter()
                .map(|axis| lower.matches(axis).count() as f32)
                .collect();
            data.push(0.01);
            Vector::new(data)
        }
    }

    impl Embedder for AxisEmbedder {
        fn encode(&self, text: &str) -> Result<Vector> {
            self.calls.lock().push(text.to_string());
            Ok(self.embed(text))
        }

        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
            Ok(texts.iter().map(|t| self.embed(t)).collect())
        }

        fn dimension(&self) -> usize {
            self.axes.len() + 1
        }

        fn name(&self) -> &str {
            "axis"
        }
    }

    fn listings() -> Vec<Listing> {
        vec![
            Listing::new("Terrace", "Lekki, Lagos").with_description("garden"),
            Listing::new("Duplex", "Ikoyi, Lagos").with_description("pool pool"),
            Listing::new("Bungalow", "Abuja").with_description("beach beach beach"),
            Listing::new("Penthouse", "Victoria Island, Lagos").with_description("beach"),
            Listing::new("Cottage", "Lagos").with_description("garden garden"),
        ]
    }

    fn resolver_with(
        listings: Vec<Listing>,
        config: ResolverConfig,
    ) -> (HybridResolver, Arc<AxisEmbedder>) {
        let embedder = Arc::new(AxisEmbedder::new(vec!["beach", "garden", "pool"]));
        let corpus = Arc::new(Corpus::new(listings));
        let index = Arc::new(EmbeddingIndex::build(&corpus, embedder.as_ref()).unwrap());
        let resolver = HybridResolver::new(corpus, index, embedder.clone(), config).unwrap();
        (resolver, embedder)
    }

    fn resolver() -> (HybridResolver, Arc<AxisEmbedder>) {
        resolver_with(listings(), ResolverConfig::default())
    }

    #[test]
    fn test_empty_query_browses() {
        let (resolver, embedder) = resolver();
        let first = resolver.search("   ", 3).unwrap();
        assert_eq!(first.strategy, Strategy::Browse);
        assert_eq!(first.positions(), vec![0, 1, 2]);
        assert_eq!(resolver.search("", 3).unwrap(), first);
        assert_eq!(resolver.search("", 50).unwrap().len(), 5);
        assert!(embedder.query_calls().is_empty());
    }

    #[test]
    fn test_keyword_path_skips_model() {
        let (resolver, embedder) = resolver();
        let outcome = resolver.search("  LAGOS ", 10).unwrap();
        assert_eq!(outcome.strategy, Strategy::Keyword);
        assert_eq!(outcome.query, "lagos");
        assert_eq!(outcome.positions(), vec![0, 1, 3, 4]);
        assert!(outcome.hits.iter().all(|h| h.score.is_none()));
        assert!(embedder.query_calls().is_empty());
    }

    #[test]
    fn test_keyword_path_truncates_to_limit() {
        let (resolver, _) = resolver();
        let outcome = resolver.search("lagos", 2).unwrap();
        assert_eq!(outcome.positions(), vec![0, 1]);
    }

    #[test]
    fn test_two_matches_fall_back_to_semantic() {
        let (resolver, embedder) = resolver();
        // "garden" occurs in two descriptions only
        let outcome = resolver.search("Garden", 10).unwrap();
        assert_eq!(outcome.strategy, Strategy::Semantic);
        assert_eq!(outcome.len(), 5);
        assert_eq!(embedder.query_calls(), vec!["garden".to_string()]);
        assert_eq!(outcome.hits[0].position, 0);
        assert_eq!(outcome.hits[1].position, 4);
    }

    #[test]
    fn test_zero_matches_semantic_top_k() {
        let (resolver, embedder) = resolver();
        let outcome = resolver.search("waterfront beach", 3).unwrap();
        assert_eq!(outcome.strategy, Strategy::Semantic);
        assert_eq!(outcome.len(), 3);
        assert_eq!(embedder.query_calls().len(), 1);
        assert_eq!(outcome.positions()[..2], [3, 2]);

        let scores: Vec<f32> = outcome.hits.iter().map(|h| h.score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_selection_order_returns_same_set() {
        let config = ResolverConfig {
            semantic_order: SemanticOrder::Selection,
            ..ResolverConfig::default()
        };
        let (resolver, _) = resolver_with(listings(), config);
        let (ranked, _) = self::resolver();

        let mut raw = resolver.search("beach", 2).unwrap().positions();
        raw.sort_unstable();
        let mut sorted = ranked.search("beach", 2).unwrap().positions();
        sorted.sort_unstable();
        assert_eq!(raw, sorted);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let (resolver, _) = resolver();
        assert!(matches!(resolver.search("lagos", 0), Err(Error::InvalidLimit(0))));
    }

    #[test]
    fn test_chat_ignores_keyword_threshold() {
        let (resolver, embedder) = resolver();
        let outcome = resolver.chat("  Lagos pool  ").unwrap();
        assert_eq!(outcome.strategy, Strategy::Semantic);
        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.hits[0].position, 1);
        assert_eq!(embedder.query_calls(), vec!["Lagos pool".to_string()]);
    }

    #[test]
    fn test_chat_rejects_blank_message() {
        let (resolver, embedder) = resolver();
        let err = resolver.chat(" \t ").unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert!(err.is_client_error());
        assert!(embedder.query_calls().is_empty());
    }

    #[test]
    fn test_small_corpus_truncates_chat() {
        let (resolver, _) =
            resolver_with(vec![Listing::new("Solo", "Jos")], ResolverConfig::default());
        assert_eq!(resolver.chat("anything").unwrap().len(), 1);
        assert_eq!(resolver.search("nothing like it", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_corpus_never_encodes() {
        let (resolver, embedder) = resolver_with(Vec::new(), ResolverConfig::default());
        assert!(resolver.search("", 5).unwrap().is_empty());
        assert!(resolver.search("lagos", 5).unwrap().is_empty());
        assert!(resolver.chat("lagos").unwrap().is_empty());
        assert!(embedder.query_calls().is_empty());
    }

    #[test]
    fn test_rejects_misaligned_index() {
        let embedder = Arc::new(AxisEmbedder::new(vec!["beach"]));
        let corpus = Arc::new(Corpus::new(listings()));
        let index = EmbeddingIndex::from_vectors(Vec::new(), 2, "axis").unwrap();
        let err = HybridResolver::new(corpus, Arc::new(index), embedder, ResolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::IndexMisaligned { expected: 5, actual: 0 }));
    }

    #[test]
    fn test_rejects_zero_keyword_threshold() {
        let embedder = Arc::new(AxisEmbedder::new(vec!["beach"]));
        let corpus = Arc::new(Corpus::new(listings()));
        let index = Arc::new(EmbeddingIndex::build(&corpus, embedder.as_ref()).unwrap());
        let config = ResolverConfig {
            keyword_threshold: 0,
            ..ResolverConfig::default()
        };
        let err = HybridResolver::new(corpus, index, embedder, config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
