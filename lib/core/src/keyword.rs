use crate::Corpus;

/// A normalized free-text query used for exact substring matching.
///
/// Matching is raw containment over the lower-cased title, location and
/// description. There is no tokenization or stemming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    needle: String,
}

impl KeywordQuery {
    /// Trim and lower-case; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            None
        } else {
            Some(Self { needle })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.needle
    }

    /// Matching positions in corpus order
    pub fn matching_positions(&self, corpus: &Corpus) -> Vec<usize> {
        corpus.positions_containing(&self.needle).collect()
    }
}

impl std::fmt::Display for KeywordQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.needle)
    }
}
