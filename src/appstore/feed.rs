//! Parsing of the customer-reviews feed and normalization of its entries.
//!
//! The feed is JSON-rendered RSS: every interesting value hides behind a
//! `label` key, and containers collapse to scalars when they hold a single
//! item. Parsing therefore works on `serde_json::Value` so one broken entry
//! never poisons the rest of the page.

use crate::appstore::models::Review;
use crate::appstore::storefronts::Storefront;
use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

/// One parsed feed page: raw entries in upstream order plus the
/// "more pages remain" signal.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub entries: Vec<Value>,
    pub has_next: bool,
}

/// Parses a feed response body into entries and the pagination signal.
///
/// An empty or absent entry list is a normal result, not an error; a body
/// that is not JSON at all is a document-level failure.
pub fn parse_page(body: &str) -> Result<FeedPage, serde_json::Error> {
    let document: Value = serde_json::from_str(body)?;
    let feed = document.get("feed").unwrap_or(&Value::Null);

    Ok(FeedPage {
        entries: coerce_entries(feed.get("entry")),
        has_next: has_next_link(feed.get("link")),
    })
}

/// Coerces the feed's `entry` container to a list.
///
/// The upstream API collapses a single-entry container to a bare object, so
/// the contract here is: missing or null becomes the empty list, an array
/// stays as-is, and any other value becomes a one-element list.
fn coerce_entries(entry: Option<&Value>) -> Vec<Value> {
    match entry {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(single) => vec![single.clone()],
    }
}

/// True if any navigation link carries `rel == "next"`.
fn has_next_link(link: Option<&Value>) -> bool {
    link.and_then(Value::as_array).is_some_and(|links| {
        links.iter().any(|link| {
            link.get("attributes").and_then(|attrs| attrs.get("rel")).and_then(Value::as_str)
                == Some("next")
        })
    })
}

/// A single feed entry that cannot be normalized.
///
/// Fails only the entry it names; the surrounding page keeps processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feed entry missing or malformed field '{0}'")]
pub struct MalformedEntry(pub &'static str);

/// Converts one raw feed entry into a normalized [`Review`].
///
/// The storefront code is attached as `country` regardless of anything the
/// feed itself reports.
pub fn normalize_entry(entry: &Value, storefront: Storefront) -> Result<Review, MalformedEntry> {
    if !entry.is_object() {
        return Err(MalformedEntry("entry"));
    }

    let author = entry
        .get("author")
        .and_then(|author| author.get("name"))
        .and_then(|name| name.get("label"))
        .and_then(Value::as_str)
        .ok_or(MalformedEntry("author.name"))?;

    let date = DateTime::parse_from_rfc3339(label(entry, "updated")?)
        .map_err(|_| MalformedEntry("updated"))?;

    Ok(Review {
        id: label(entry, "id")?.to_string(),
        author: author.to_string(),
        version: label(entry, "im:version")?.to_string(),
        rating: parsed_label(entry, "im:rating")?,
        title: label(entry, "title")?.to_string(),
        content: label(entry, "content")?.to_string(),
        vote_count: parsed_label(entry, "im:voteCount")?,
        vote_sum: parsed_label(entry, "im:voteSum")?,
        date,
        country: storefront.code().to_string(),
    })
}

fn label<'a>(entry: &'a Value, field: &'static str) -> Result<&'a str, MalformedEntry> {
    entry
        .get(field)
        .and_then(|value| value.get("label"))
        .and_then(Value::as_str)
        .ok_or(MalformedEntry(field))
}

fn parsed_label<T: std::str::FromStr>(
    entry: &Value,
    field: &'static str,
) -> Result<T, MalformedEntry> {
    label(entry, field)?.parse().map_err(|_| MalformedEntry(field))
}
