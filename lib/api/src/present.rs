//! Display-ready shapes for listings.
//!
//! Formatting lives here and nowhere else: the resolver hands out corpus
//! positions, and this module turns them into cards and result pages.

use estately_core::{Listing, Strategy};
use serde::Serialize;

/// Card ids are the title cut to this many characters
pub const CARD_ID_CHARS: usize = 30;

const CURRENCY_SYMBOL: char = '₦';

/// `12500000` -> `₦12,500,000`
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}{}", CURRENCY_SYMBOL, grouped)
    } else {
        format!("{}{}", CURRENCY_SYMBOL, grouped)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// The reduced listing shown in chat replies
#[derive(Debug, Clone, Serialize)]
pub struct PropertyCard {
    pub id: String,
    pub title: String,
    pub price: String,
    pub price_amount: i64,
    pub location: String,
    pub image_url: String,
    pub bedrooms: serde_json::Value,
    pub bathrooms: serde_json::Value,
    pub area_sqm: serde_json::Value,
}

impl PropertyCard {
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            id: truncate_chars(&listing.title, CARD_ID_CHARS),
            title: listing.title.clone(),
            price: format_price(listing.price),
            price_amount: listing.price,
            location: listing.location.clone(),
            image_url: listing.image_url.trim().to_string(),
            bedrooms: listing.bedrooms.to_display_value(),
            bathrooms: listing.bathrooms.to_display_value(),
            area_sqm: listing.area_sqm.to_display_value(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub properties: Vec<PropertyCard>,
}

impl ChatReply {
    pub fn new<'a>(message: &str, listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        let properties: Vec<PropertyCard> =
            listings.into_iter().map(PropertyCard::from_listing).collect();
        let reply = match properties.len() {
            1 => format!("Here is 1 property matching *'{}'*:", message),
            n => format!("Here are {} properties matching *'{}'*:", n, message),
        };

        Self { reply, properties }
    }
}

/// A full listing in a result page, with its similarity when ranked
#[derive(Debug, Serialize)]
pub struct ListingView<'a> {
    #[serde(flatten)]
    pub listing: &'a Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SearchPage<'a> {
    pub query: String,
    pub strategy: Strategy,
    pub count: usize,
    pub properties: Vec<ListingView<'a>>,
}
