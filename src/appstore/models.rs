//! Normalized review records and their deterministic ordering.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One customer review, normalized from a raw feed entry.
///
/// The serialized field names (`voteCount`, `voteSum`, ...) are frozen:
/// downstream consumers read the emitted JSON files by these exact keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Globally unique review id, used as the cross-storefront dedup key.
    pub id: String,
    /// Reviewer's display name.
    pub author: String,
    /// App version the review was written against.
    pub version: String,
    /// Star rating, 1-5.
    pub rating: u8,
    /// Review headline.
    pub title: String,
    /// Review body, may be empty.
    pub content: String,
    /// Total helpfulness votes.
    pub vote_count: u32,
    /// Sum of helpfulness votes.
    pub vote_sum: u32,
    /// Review timestamp with the feed's timezone offset preserved.
    pub date: DateTime<FixedOffset>,
    /// Upper-case storefront code the review was fetched from.
    pub country: String,
}

/// Sorts reviews newest first.
///
/// The sort is stable: reviews sharing a timestamp keep their arrival order,
/// so identical input always produces identical output.
pub fn sort_newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| b.date.cmp(&a.date));
}
