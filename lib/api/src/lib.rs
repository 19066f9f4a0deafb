pub mod present;
pub mod rest;

pub use present::{format_price, ChatReply, ListingView, PropertyCard, SearchPage};
pub use rest::{configure, ApiConfig, RestApi};
