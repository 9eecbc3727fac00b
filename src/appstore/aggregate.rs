//! Cross-storefront merging with dedup by review id.

use crate::appstore::models::{self, Review};
use std::collections::HashSet;

/// Single owner of the merged review collection and the seen-id set.
///
/// Storefront results are absorbed in iteration order, so when the same
/// review id shows up in several storefronts, the first storefront processed
/// wins and later copies only bump the duplicate count.
#[derive(Debug, Default)]
pub struct Aggregator {
    seen_ids: HashSet<String>,
    merged: Vec<Review>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one storefront's reviews into the merged collection.
    ///
    /// Returns how many reviews were dropped as duplicates of already-seen
    /// ids; callers report that count rather than losing it silently.
    pub fn absorb(&mut self, reviews: &[Review]) -> usize {
        let mut duplicates = 0;
        for review in reviews {
            if self.seen_ids.insert(review.id.clone()) {
                self.merged.push(review.clone());
            } else {
                duplicates += 1;
            }
        }
        duplicates
    }

    /// Number of unique reviews merged so far.
    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// Hands back the merged collection, stably sorted newest first.
    pub fn into_merged(self) -> Vec<Review> {
        let mut merged = self.merged;
        models::sort_newest_first(&mut merged);
        merged
    }
}
