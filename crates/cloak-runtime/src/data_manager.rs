//! TTL-cached ingestion of the raw table.
//!
//! [`IngestionManager`] owns the [`Dashboard`] and is the only place that
//! replaces its store. A refresh is one opaque fetch followed by a decode;
//! the fetch either delivers the whole text or fails the cycle, in which
//! case the previous store stays in place. There is no retry.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cloak_core::error::{CloakError, Result};
use cloak_core::selection::{Selection, SelectionIntent};
use cloak_data::dashboard::Dashboard;
use cloak_data::projection::DashboardView;
use cloak_data::store::TimeSeriesStore;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

// ── Sources ───────────────────────────────────────────────────────────────────

/// Something that can deliver the raw table text.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short description for log lines, e.g. a path.
    fn describe(&self) -> String;

    /// Fetch the whole table. A failure ends the ingestion cycle.
    async fn fetch(&self) -> Result<String>;
}

/// Reads the export from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl TableSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CloakError::FileRead {
                path: self.path.clone(),
                source,
            })
    }
}

/// In-memory source holding either a table or a fixed failure message.
#[derive(Debug, Clone)]
pub struct StaticSource {
    body: std::result::Result<String, String>,
}

impl StaticSource {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            body: Ok(text.into()),
        }
    }

    /// Every fetch fails with [`CloakError::Fetch`] carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            body: Err(message.into()),
        }
    }
}

#[async_trait]
impl TableSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        self.body.clone().map_err(CloakError::Fetch)
    }
}

// ── IngestionManager ──────────────────────────────────────────────────────────

/// Owns the dashboard context and refreshes its store from a source.
///
/// # Example
/// ```no_run
/// use cloak_runtime::data_manager::{FileSource, IngestionManager};
///
/// # async fn run() -> cloak_core::Result<()> {
/// let mut mgr = IngestionManager::new(FileSource::new("export.csv"), 30);
/// let dashboard = mgr.refresh(false).await?;
/// println!("dates: {}", dashboard.store().len());
/// # Ok(())
/// # }
/// ```
pub struct IngestionManager<S> {
    source: S,
    /// Maximum age of the current store before a refresh refetches.
    cache_ttl: Duration,
    dashboard: Dashboard,
    /// When the store was last replaced, for TTL checks.
    cache_timestamp: Option<Instant>,
    /// Wall-clock time of the last successful ingestion.
    last_update: Option<DateTime<Utc>>,
    /// Message of the last failed fetch, cleared on success.
    last_error: Option<String>,
}

impl<S: TableSource> IngestionManager<S> {
    pub fn new(source: S, cache_ttl_secs: u64) -> Self {
        Self::with_dashboard(source, cache_ttl_secs, Dashboard::new())
    }

    /// Start from an existing dashboard, e.g. one with a selection already
    /// applied.
    pub fn with_dashboard(source: S, cache_ttl_secs: u64, dashboard: Dashboard) -> Self {
        Self {
            source,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            dashboard,
            cache_timestamp: None,
            last_update: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Refetch and re-decode the table unless the current store is fresh.
    ///
    /// With `force` the TTL is ignored. A fetch failure is returned as-is,
    /// recorded in [`last_error`](Self::last_error), and leaves the current
    /// store untouched.
    pub async fn refresh(&mut self, force: bool) -> Result<&Dashboard> {
        if !force && self.is_cache_valid() {
            tracing::debug!("store still fresh; skipping fetch");
            return Ok(&self.dashboard);
        }

        let source = self.source.describe();
        match self.source.fetch().await {
            Ok(raw) => {
                let store = TimeSeriesStore::decode(&raw);
                tracing::info!(source = %source, records = store.len(), "table ingested");
                self.dashboard.replace_store(store);
                self.cache_timestamp = Some(Instant::now());
                self.last_update = Some(Utc::now());
                self.last_error = None;
                Ok(&self.dashboard)
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "fetch failed; keeping previous store");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn apply(&mut self, intent: SelectionIntent) {
        self.dashboard.apply(intent);
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.dashboard.set_selection(selection);
    }

    pub fn view(&self) -> DashboardView {
        self.dashboard.view()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Age of the current store, or `None` before the first ingestion.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Force the next [`refresh`](Self::refresh) to fetch. The store is kept.
    pub fn invalidate_cache(&mut self) {
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        self.cache_timestamp
            .is_some_and(|ts| ts.elapsed() < self.cache_ttl)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use cloak_core::models::SeriesId;

    const TABLE: &str = "日期,JB\n,,Meta,Fail,GA4\n8/1,JB,100,25.00,75\n8/2,JB,200,50%,100\n";

    /// Replays a fixed list of responses and counts fetches.
    struct ScriptedSource {
        responses: Mutex<VecDeque<std::result::Result<String, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<std::result::Result<&str, &str>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TableSource for ScriptedSource {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        async fn fetch(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(r) => r.map_err(CloakError::Fetch),
                None => Err(CloakError::Fetch("no more responses".to_string())),
            }
        }
    }

    // ── first ingestion ───────────────────────────────────────────────────

    #[tokio::test]
    async fn test_no_data_before_first_refresh() {
        let mgr = IngestionManager::new(StaticSource::ok(TABLE), 30);
        assert!(mgr.dashboard().store().is_empty());
        assert!(mgr.last_update().is_none());
        assert!(mgr.last_error().is_none());
        assert!(mgr.cache_age().is_none());
    }

    #[tokio::test]
    async fn test_refresh_ingests_table() {
        let mut mgr = IngestionManager::new(StaticSource::ok(TABLE), 30);
        let dashboard = mgr.refresh(false).await.unwrap();
        assert_eq!(dashboard.store().dates(), vec!["8/1", "8/2"]);
        assert!(mgr.last_update().is_some());
        assert!(mgr.cache_age().unwrap() < Duration::from_secs(5));
    }

    // ── TTL ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fresh_store_skips_fetch() {
        let mut mgr = IngestionManager::new(ScriptedSource::new(vec![Ok(TABLE)]), 60);
        mgr.refresh(false).await.unwrap();
        mgr.refresh(false).await.unwrap();
        assert_eq!(mgr.source.calls(), 1);
        assert_eq!(mgr.dashboard().store().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let second = "h\nh\n9/1,JB,1,1,1\n";
        let mut mgr =
            IngestionManager::new(ScriptedSource::new(vec![Ok(TABLE), Ok(second)]), 0);
        mgr.refresh(false).await.unwrap();
        mgr.refresh(false).await.unwrap();
        assert_eq!(mgr.source.calls(), 2);
        assert_eq!(mgr.dashboard().store().dates(), vec!["9/1"]);
    }

    #[tokio::test]
    async fn test_force_and_invalidate_bypass_ttl() {
        let mut mgr = IngestionManager::new(
            ScriptedSource::new(vec![Ok(TABLE), Ok(TABLE), Ok(TABLE)]),
            60,
        );
        mgr.refresh(false).await.unwrap();
        mgr.refresh(true).await.unwrap();
        assert_eq!(mgr.source.calls(), 2);

        mgr.invalidate_cache();
        assert!(mgr.cache_age().is_none());
        assert_eq!(mgr.dashboard().store().len(), 2);
        mgr.refresh(false).await.unwrap();
        assert_eq!(mgr.source.calls(), 3);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_failure_is_returned_verbatim() {
        let mut mgr = IngestionManager::new(StaticSource::failing("HTTP error! status: 500"), 30);
        let err = mgr.refresh(false).await.unwrap_err();
        assert!(matches!(err, CloakError::Fetch(ref m) if m == "HTTP error! status: 500"));
        assert_eq!(
            mgr.last_error(),
            Some("Failed to fetch table: HTTP error! status: 500")
        );
        assert!(mgr.last_update().is_none());
    }

    #[tokio::test]
    async fn test_failure_leaves_prior_store_untouched() {
        let mut mgr =
            IngestionManager::new(ScriptedSource::new(vec![Ok(TABLE), Err("timeout")]), 0);
        mgr.refresh(false).await.unwrap();
        let before = mgr.dashboard().store().clone();
        let stamp = mgr.last_update();

        assert!(mgr.refresh(false).await.is_err());
        assert_eq!(mgr.dashboard().store(), &before);
        assert_eq!(mgr.last_update(), stamp);
        assert!(mgr.last_error().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let mut mgr =
            IngestionManager::new(ScriptedSource::new(vec![Err("down"), Ok(TABLE)]), 30);
        assert!(mgr.refresh(false).await.is_err());
        assert!(mgr.last_error().is_some());
        mgr.refresh(false).await.unwrap();
        assert!(mgr.last_error().is_none());
    }

    // ── selection passthrough ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_selection_applies_to_view() {
        let mut mgr = IngestionManager::new(StaticSource::ok(TABLE), 30);
        mgr.refresh(false).await.unwrap();
        mgr.apply(SelectionIntent::SetEntity {
            series: SeriesId::Jb,
            entity_id: "jt01".to_string(),
            checked: true,
        });
        let view = mgr.view();
        assert_eq!(view.series.len(), 1);
        assert_eq!(view.summary.total_meta, 300);

        mgr.set_selection(Selection::default());
        assert!(mgr.view().series.is_empty());
    }

    // ── FileSource ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_file_source_reads_table() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(TABLE.as_bytes()).expect("write table");

        let source = FileSource::new(file.path());
        assert_eq!(source.describe(), file.path().display().to_string());
        let mut mgr = IngestionManager::new(source, 30);
        let dashboard = mgr.refresh(true).await.unwrap();
        assert_eq!(dashboard.store().len(), 2);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("missing.csv");
        let err = FileSource::new(&path).fetch().await.unwrap_err();
        match err {
            CloakError::FileRead { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
