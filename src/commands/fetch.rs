//! Fetch command: download reviews for every requested storefront.

use crate::appstore::aggregate::Aggregator;
use crate::appstore::client::{FeedClient, FeedSource};
use crate::appstore::pager;
use crate::appstore::storefronts::{self, Storefront};
use crate::config::{Config, OutputMode};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Downloads reviews across storefronts and writes the JSON output files.
pub struct FetchCommand {
    config: Config,
}

/// Per-storefront outcome of a run.
#[derive(Debug)]
pub struct StorefrontReport {
    pub storefront: Storefront,
    pub collected: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub error: Option<String>,
    pub path: Option<PathBuf>,
}

impl StorefrontReport {
    fn progress_line(&self) -> String {
        let mut line = match &self.error {
            Some(err) => {
                format!("  {}: ERROR ({}), kept {} reviews", self.storefront, err, self.collected)
            }
            None => format!("  {}: {} reviews", self.storefront, self.collected),
        };
        if self.duplicates > 0 {
            line.push_str(&format!(", {} duplicates dropped", self.duplicates));
        }
        if self.malformed > 0 {
            line.push_str(&format!(", {} malformed entries skipped", self.malformed));
        }
        if let Some(path) = &self.path {
            line.push_str(&format!(" -> {}", path.display()));
        }
        line
    }
}

/// Full run outcome: per-storefront reports plus the merged file, if any.
#[derive(Debug)]
pub struct RunReport {
    pub storefronts: Vec<StorefrontReport>,
    pub merged: Option<(usize, PathBuf)>,
}

impl RunReport {
    /// Total reviews collected across storefronts, before deduplication.
    pub fn total_collected(&self) -> usize {
        self.storefronts.iter().map(|r| r.collected).sum()
    }

    /// Storefronts whose pagination ended with an error.
    pub fn failed(&self) -> usize {
        self.storefronts.iter().filter(|r| r.error.is_some()).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.merged {
            Some((count, path)) => {
                write!(f, "Merged {} unique reviews -> {}", count, path.display())?;
            }
            None => {
                write!(
                    f,
                    "Done. {} reviews across {} storefronts",
                    self.total_collected(),
                    self.storefronts.len()
                )?;
            }
        }
        if self.failed() > 0 {
            write!(f, " ({} storefronts failed)", self.failed())?;
        }
        Ok(())
    }
}

impl FetchCommand {
    /// Creates a new fetch command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the full fetch and returns the run report.
    pub async fn execute(&self, app_id: &str, requested: &[String]) -> Result<RunReport> {
        let client = FeedClient::new(&self.config).context("Failed to create HTTP client")?;
        self.execute_with_client(&client, app_id, requested).await
    }

    /// Runs the fetch with a provided feed source (for testing).
    ///
    /// Validation happens before the first network call: an unknown
    /// storefront code aborts the whole run, while later per-storefront
    /// failures only mark that storefront and continue.
    pub async fn execute_with_client(
        &self,
        client: &impl FeedSource,
        app_id: &str,
        requested: &[String],
    ) -> Result<RunReport> {
        let app_id = app_id.trim();
        if app_id.is_empty() {
            anyhow::bail!("App id must not be empty");
        }

        let selected = storefronts::validate(requested)?;
        let writer = OutputWriter::new(&self.config.output_dir, app_id)?;
        let pause = Duration::from_millis(self.config.delay_ms);

        info!("Fetching reviews for app {} ({} storefronts)", app_id, selected.len());

        let mut aggregator = Aggregator::new();
        let mut reports = Vec::with_capacity(selected.len());

        for &storefront in &selected {
            info!("{}: downloading", storefront);
            let outcome = pager::fetch_storefront(client, app_id, storefront, pause).await;
            let duplicates = aggregator.absorb(&outcome.reviews);

            let path = match self.config.mode {
                OutputMode::PerStorefront => {
                    Some(writer.write_storefront(storefront, &outcome.reviews)?)
                }
                OutputMode::Merged => None,
            };

            let report = StorefrontReport {
                storefront,
                collected: outcome.reviews.len(),
                duplicates,
                malformed: outcome.malformed,
                error: outcome.error.map(|err| err.to_string()),
                path,
            };
            println!("{}", report.progress_line());
            reports.push(report);
        }

        let merged = match self.config.mode {
            OutputMode::Merged => {
                let merged = aggregator.into_merged();
                let path = writer.write_merged(&merged)?;
                Some((merged.len(), path))
            }
            OutputMode::PerStorefront => None,
        };

        Ok(RunReport { storefronts: reports, merged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appstore::client::FeedError;
    use crate::appstore::models::Review;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    fn raw_entry(id: &str, date: &str) -> Value {
        json!({
            "id": { "label": id },
            "author": { "name": { "label": "reviewer" } },
            "im:version": { "label": "1.0" },
            "im:rating": { "label": "5" },
            "title": { "label": "title" },
            "content": { "label": "content" },
            "im:voteCount": { "label": "0" },
            "im:voteSum": { "label": "0" },
            "updated": { "label": date }
        })
    }

    fn page_body(entries: &[Value], with_next: bool) -> String {
        let mut links = vec![json!({ "attributes": { "rel": "self", "href": "s" } })];
        if with_next {
            links.push(json!({ "attributes": { "rel": "next", "href": "n" } }));
        }
        json!({ "feed": { "entry": entries, "link": links } }).to_string()
    }

    /// Feed source scripted per (storefront, page); unscripted pages 404.
    struct ScriptedSource {
        pages: HashMap<(String, u32), String>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self { pages: HashMap::new(), calls: AtomicU32::new(0) }
        }

        fn with_page(mut self, code: &str, page: u32, body: String) -> Self {
            self.pages.insert((code.to_string(), page), body);
            self
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeedSource for ScriptedSource {
        async fn page(
            &self,
            _app_id: &str,
            storefront: Storefront,
            page: u32,
        ) -> Result<Option<String>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.get(&(storefront.code().to_string(), page)).cloned())
        }
    }

    fn make_test_config(dir: &TempDir, mode: OutputMode) -> Config {
        Config {
            delay_ms: 0,
            proxy: None,
            output_dir: dir.path().to_path_buf(),
            mode,
        }
    }

    fn read_reviews(path: &std::path::Path) -> Vec<Review> {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_two_pages_then_empty_page() {
        let source = ScriptedSource::new()
            .with_page("US", 1, page_body(&[raw_entry("1", "2024-03-01T10:00:00+00:00")], true))
            .with_page("US", 2, page_body(&[raw_entry("2", "2024-03-02T10:00:00+00:00")], true))
            .with_page("US", 3, page_body(&[], true));

        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));
        let report =
            cmd.execute_with_client(&source, "123", &["us".to_string()]).await.unwrap();

        assert_eq!(report.total_collected(), 2);
        assert_eq!(report.failed(), 0);

        let reviews = read_reviews(&dir.path().join("123-us.json"));
        assert_eq!(reviews.len(), 2);
        // Newest first, storefront attached.
        assert_eq!(reviews[0].id, "2");
        assert_eq!(reviews[1].id, "1");
        assert!(reviews.iter().all(|r| r.country == "US"));
    }

    #[tokio::test]
    async fn test_unknown_storefront_aborts_before_any_fetch() {
        let source = ScriptedSource::new();
        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));

        let err = cmd
            .execute_with_client(&source, "123", &["zz".to_string(), "us".to_string()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("ZZ"));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_app_id_is_rejected() {
        let source = ScriptedSource::new();
        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));

        let err = cmd.execute_with_client(&source, "  ", &[]).await.unwrap_err();
        assert!(err.to_string().contains("App id"));
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_merged_mode_dedups_across_storefronts() {
        // "shared" appears in both storefronts; iteration order is FR, US.
        let source = ScriptedSource::new()
            .with_page(
                "FR",
                1,
                page_body(
                    &[
                        raw_entry("shared", "2024-03-01T10:00:00+00:00"),
                        raw_entry("fr-only", "2024-03-02T10:00:00+00:00"),
                    ],
                    false,
                ),
            )
            .with_page(
                "US",
                1,
                page_body(
                    &[
                        raw_entry("shared", "2024-03-01T10:00:00+00:00"),
                        raw_entry("us-only", "2024-03-03T10:00:00+00:00"),
                    ],
                    false,
                ),
            );

        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::Merged));
        let report = cmd
            .execute_with_client(&source, "123", &["us".to_string(), "fr".to_string()])
            .await
            .unwrap();

        // countUS + countFR - 1 records in the merged file.
        let (count, path) = report.merged.as_ref().unwrap();
        assert_eq!(*count, 3);
        let merged = read_reviews(path);
        assert_eq!(merged.len(), 3);
        assert_eq!(path.file_name().unwrap(), "123-all.json");

        // First storefront processed (FR) won the shared id.
        let shared = merged.iter().find(|r| r.id == "shared").unwrap();
        assert_eq!(shared.country, "FR");

        // The duplicate was counted against the later storefront.
        let us_report =
            report.storefronts.iter().find(|r| r.storefront.code() == "US").unwrap();
        assert_eq!(us_report.duplicates, 1);

        // Merged output is globally sorted newest first.
        assert_eq!(merged[0].id, "us-only");
    }

    #[tokio::test]
    async fn test_storefront_error_does_not_abort_run() {
        let source = ScriptedSource::new()
            .with_page("DE", 1, "not json at all".to_string())
            .with_page("US", 1, page_body(&[raw_entry("1", "2024-03-01T10:00:00+00:00")], false));

        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));
        let report = cmd
            .execute_with_client(&source, "123", &["de".to_string(), "us".to_string()])
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        let de = report.storefronts.iter().find(|r| r.storefront.code() == "DE").unwrap();
        assert!(de.error.as_ref().unwrap().contains("malformed feed document"));

        // The healthy storefront still produced its file.
        let reviews = read_reviews(&dir.path().join("123-us.json"));
        assert_eq!(reviews.len(), 1);
    }

    #[tokio::test]
    async fn test_per_storefront_file_written_even_when_empty() {
        // US has no scripted pages: every request 404s.
        let source = ScriptedSource::new();
        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));

        let report =
            cmd.execute_with_client(&source, "123", &["us".to_string()]).await.unwrap();

        assert_eq!(report.total_collected(), 0);
        assert_eq!(report.failed(), 0);
        assert!(dir.path().join("123-us.json").exists());
    }

    #[tokio::test]
    async fn test_run_report_display() {
        let source = ScriptedSource::new()
            .with_page("US", 1, page_body(&[raw_entry("1", "2024-03-01T10:00:00+00:00")], false));

        let dir = TempDir::new().unwrap();
        let cmd = FetchCommand::new(make_test_config(&dir, OutputMode::PerStorefront));
        let report =
            cmd.execute_with_client(&source, "123", &["us".to_string()]).await.unwrap();

        let text = report.to_string();
        assert!(text.contains("1 reviews"));
        assert!(text.contains("1 storefronts"));
    }
}
