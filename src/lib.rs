//! appstore-reviews - Download public App Store customer reviews.
//!
//! Walks Apple's paginated customer-reviews feed storefront by storefront
//! and writes the reviews as normalized JSON, newest to oldest.

pub mod appstore;
pub mod commands;
pub mod config;
pub mod output;

pub use appstore::models::Review;
pub use appstore::storefronts::Storefront;
pub use config::{Config, OutputMode};
