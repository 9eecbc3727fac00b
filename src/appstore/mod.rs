//! App Store feed modules: registry, HTTP client, parsing, pagination, merge.

pub mod aggregate;
pub mod client;
pub mod feed;
pub mod models;
pub mod pager;
pub mod storefronts;

pub use aggregate::Aggregator;
pub use client::{FeedClient, FeedError, FeedSource};
pub use models::Review;
pub use storefronts::Storefront;
