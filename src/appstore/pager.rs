//! Pagination loop: walks one storefront's feed from page 1 to exhaustion.

use crate::appstore::client::{FeedError, FeedSource};
use crate::appstore::feed;
use crate::appstore::models::{self, Review};
use crate::appstore::storefronts::Storefront;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything one storefront's pagination produced.
///
/// On failure partway through, `reviews` holds everything collected before
/// the failure and `error` records why pagination stopped.
#[derive(Debug)]
pub struct StorefrontReviews {
    pub storefront: Storefront,
    pub reviews: Vec<Review>,
    pub malformed: usize,
    pub error: Option<FeedError>,
}

impl StorefrontReviews {
    fn new(storefront: Storefront) -> Self {
        Self { storefront, reviews: Vec::new(), malformed: 0, error: None }
    }
}

/// What to do after a page has been fetched and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageDisposition {
    /// Entries present and a next link exists: pause, then fetch page n+1.
    Advance,
    /// Entries present but no next link: this was the final page.
    LastPage,
    /// Zero entries: the storefront is exhausted, even if the feed still
    /// claims a next page. Inconsistent feeds must not loop forever.
    Exhausted,
}

fn classify(entry_count: usize, has_next: bool) -> PageDisposition {
    if entry_count == 0 {
        PageDisposition::Exhausted
    } else if has_next {
        PageDisposition::Advance
    } else {
        PageDisposition::LastPage
    }
}

/// Downloads every review one storefront has for the app.
///
/// Pages are fetched strictly sequentially, separated by `pause`. A fetch or
/// document failure is terminal for the storefront and is surfaced alongside
/// the partial results; it is never retried. The returned list is stably
/// sorted newest first.
pub async fn fetch_storefront(
    source: &impl FeedSource,
    app_id: &str,
    storefront: Storefront,
    pause: Duration,
) -> StorefrontReviews {
    let mut out = StorefrontReviews::new(storefront);
    let mut page = 1u32;

    loop {
        let body = match source.page(app_id, storefront, page).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                debug!("{}: no feed on page {}, done", storefront, page);
                break;
            }
            Err(err) => {
                warn!("{}: fetch failed on page {}: {}", storefront, page, err);
                out.error = Some(err);
                break;
            }
        };

        let parsed = match feed::parse_page(&body) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("{}: broken feed document on page {}: {}", storefront, page, err);
                out.error = Some(FeedError::Document(err));
                break;
            }
        };

        for entry in &parsed.entries {
            match feed::normalize_entry(entry, storefront) {
                Ok(review) => out.reviews.push(review),
                Err(err) => {
                    warn!("{}: skipping entry on page {}: {}", storefront, page, err);
                    out.malformed += 1;
                }
            }
        }

        match classify(parsed.entries.len(), parsed.has_next) {
            PageDisposition::Exhausted | PageDisposition::LastPage => break,
            PageDisposition::Advance => {
                tokio::time::sleep(pause).await;
                page += 1;
            }
        }
    }

    models::sort_newest_first(&mut out.reviews);
    out
}
