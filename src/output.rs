//! JSON file output for collected reviews.

use crate::appstore::models::Review;
use crate::appstore::storefronts::Storefront;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes review lists as pretty-printed JSON files into one directory.
///
/// The writer only ever consumes fully-built in-memory lists, so a failed
/// write never corrupts collected data.
pub struct OutputWriter {
    dir: PathBuf,
    app_id: String,
}

impl OutputWriter {
    /// Creates the output directory (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>, app_id: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir, app_id: app_id.into() })
    }

    /// Writes one storefront's reviews to `<app_id>-<code>.json`.
    ///
    /// An empty list still produces a file: "no reviews here" is a result.
    pub fn write_storefront(&self, storefront: Storefront, reviews: &[Review]) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}-{}.json", self.app_id, storefront.code_lower()));
        write_json(&path, reviews)?;
        Ok(path)
    }

    /// Writes the merged, deduplicated collection to `<app_id>-all.json`.
    pub fn write_merged(&self, reviews: &[Review]) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}-all.json", self.app_id));
        write_json(&path, reviews)?;
        Ok(path)
    }
}

fn write_json(path: &Path, reviews: &[Review]) -> Result<()> {
    let json = serde_json::to_string_pretty(reviews).context("Failed to serialize reviews")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}
