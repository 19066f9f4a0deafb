//! Listing records and the immutable corpus they live in.
//!
//! A [`Corpus`] is built once at startup. Positions `0..len` are stable for
//! the lifetime of the process and are what the embedding index aligns to.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Sentinel shown for a measure the listing does not provide.
pub const UNKNOWN_MEASURE: &str = "N/A";

/// An optional numeric attribute (bedrooms, bathrooms, area).
///
/// Missing and `null` values both deserialize to [`Measure::Unknown`]. The
/// number is kept as given so `3` stays an integer and `120.5` stays fractional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Known(serde_json::Number),
    #[default]
    Unknown,
}

impl Measure {
    /// JSON form for presentation: the number, or the `"N/A"` sentinel
    pub fn to_display_value(&self) -> serde_json::Value {
        match self {
            Measure::Known(n) => serde_json::Value::Number(n.clone()),
            Measure::Unknown => serde_json::Value::String(UNKNOWN_MEASURE.to_string()),
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measure::Known(n) => write!(f, "{}", n),
            Measure::Unknown => f.write_str(UNKNOWN_MEASURE),
        }
    }
}

/// One real-estate property. Identity is the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub bedrooms: Measure,
    #[serde(default)]
    pub bathrooms: Measure,
    #[serde(default)]
    pub area_sqm: Measure,
}

impl Listing {
    #[must_use]
    pub fn new(title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            location: location.into(),
            description: String::new(),
            features: Vec::new(),
            price: 0,
            image_url: String::new(),
            bedrooms: Measure::Unknown,
            bathrooms: Measure::Unknown,
            area_sqm: Measure::Unknown,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    /// Text fed to the embedding model for this listing.
    ///
    /// An empty feature list leaves the `Has: ` suffix empty.
    pub fn composite_text(&self) -> String {
        format!(
            "{} in {}. {}. Has: {}",
            self.title,
            self.location,
            self.description,
            self.features.join(", ")
        )
    }
}

/// Lower-cased copies of the fields keyword matching looks at
#[derive(Debug, Clone)]
pub struct SearchKeys {
    title: String,
    location: String,
    description: String,
}

impl SearchKeys {
    fn from_listing(listing: &Listing) -> Self {
        Self {
            title: listing.title.to_lowercase(),
            location: listing.location.to_lowercase(),
            description: listing.description.to_lowercase(),
        }
    }

    /// Raw substring containment; `needle` must already be lower-cased
    #[inline]
    pub fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.location.contains(needle)
            || self.description.contains(needle)
    }
}

/// Ordered, read-only sequence of listings
#[derive(Debug, Clone)]
pub struct Corpus {
    listings: Vec<Listing>,
    keys: Vec<SearchKeys>,
}

impl Corpus {
    /// Wrap listings as given. Titles are assumed unique.
    pub fn new(listings: Vec<Listing>) -> Self {
        let keys = listings.iter().map(SearchKeys::from_listing).collect();
        Self { listings, keys }
    }

    /// Keep the first listing for every title, preserving order.
    /// Returns the corpus and the number of dropped duplicates.
    pub fn deduplicated(listings: Vec<Listing>) -> (Self, usize) {
        let total = listings.len();
        let mut seen = AHashSet::with_capacity(total);
        let unique: Vec<Listing> = listings
            .into_iter()
            .filter(|listing| seen.insert(listing.title.clone()))
            .collect();
        let removed = total - unique.len();
        (Self::new(unique), removed)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&Listing> {
        self.listings.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Listing> {
        self.listings.iter()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Positions whose search keys contain `needle`, in corpus order
    pub fn positions_containing<'a>(
        &'a self,
        needle: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        self.keys
            .iter()
            .enumerate()
            .filter(move |(_, keys)| keys.contains(needle))
            .map(|(position, _)| position)
    }

    pub fn composite_texts(&self) -> Vec<String> {
        self.listings.iter().map(Listing::composite_text).collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Listing;
    type IntoIter = std::slice::Iter<'a, Listing>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_composite_text() {
        let listing = Listing::new("Duplex", "Lekki, Lagos")
            .with_description("Spacious family home")
            .with_features(["Pool", "Gym"]);
        assert_eq!(
            listing.composite_text(),
            "Duplex in Lekki, Lagos. Spacious family home. Has: Pool, Gym"
        );
    }

    #[test]
    fn test_composite_text_without_features() {
        let listing = Listing::new("Studio", "Abuja").with_description("Compact");
        assert_eq!(listing.composite_text(), "Studio in Abuja. Compact. Has: ");
    }

    #[test]
    fn test_deserialize_missing_measures() {
        let listing: Listing = serde_json::from_value(json!({
            "title": "Bungalow",
            "location": "Ibadan",
            "description": "Quiet street",
            "price": 25000000,
            "image_url": " https://img/1.jpg ",
            "bedrooms": 3,
            "area_sqm": 120.5,
            "bathrooms": null
        }))
        .unwrap();

        assert_eq!(listing.bedrooms, Measure::Known(3.into()));
        assert!(matches!(listing.area_sqm, Measure::Known(_)));
        assert_eq!(listing.bathrooms, Measure::Unknown);
        assert!(listing.features.is_empty());
        assert_eq!(listing.bedrooms.to_string(), "3");
        assert_eq!(listing.area_sqm.to_string(), "120.5");
        assert_eq!(listing.bathrooms.to_display_value(), json!("N/A"));
    }

    #[test]
    fn test_deduplicated_keeps_first() {
        let listings = vec![
            Listing::new("A", "Lagos").with_price(1),
            Listing::new("B", "Abuja"),
            Listing::new("A", "Kano").with_price(2),
        ];
        let (corpus, removed) = Corpus::deduplicated(listings);
        assert_eq!(removed, 1);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(0).unwrap().price, 1);
        assert_eq!(corpus.get(1).unwrap().title, "B");
    }

    #[test]
    fn test_positions_containing_is_case_insensitive_on_fields() {
        let corpus = Corpus::new(vec![
            Listing::new("Terrace", "IKOYI, Lagos"),
            Listing::new("Flat", "Abuja").with_description("near Lagos road"),
            Listing::new("Villa", "Enugu").with_features(["lagos view"]),
        ]);
        let hits: Vec<usize> = corpus.positions_containing("lagos").collect();
        // features are not part of keyword matching
        assert_eq!(hits, vec![0, 1]);
    }
}
