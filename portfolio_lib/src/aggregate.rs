//! Concurrent fetch of every registered sheet into one portfolio data bag.
//!
//! One task per registry entry is spawned on a `JoinSet`; the bag is built
//! only after every task has settled. A failing sheet degrades to an empty
//! section and never affects its neighbours.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use sheets_api::{Client, Record};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::error::PortfolioError;
use crate::normalize::normalize_rows;
use crate::section::{Section, SourceRegistry};

/// Records of every fetched section. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PortfolioData {
    sections: BTreeMap<Section, Vec<Record>>,
}

impl PortfolioData {
    pub fn from_sections(sections: impl IntoIterator<Item = (Section, Vec<Record>)>) -> Self {
        Self {
            sections: sections.into_iter().collect(),
        }
    }

    /// Records of a section, or `None` if the section was never fetched.
    pub fn get(&self, section: Section) -> Option<&[Record]> {
        self.sections.get(&section).map(Vec::as_slice)
    }

    /// Records of a section; empty if the section is absent.
    pub fn rows(&self, section: Section) -> &[Record] {
        self.get(section).unwrap_or(&[])
    }

    pub fn first(&self, section: Section) -> Option<&Record> {
        self.rows(section).first()
    }

    pub fn contains(&self, section: Section) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &[Record])> {
        self.sections.iter().map(|(s, rows)| (*s, rows.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Fetches one section, normalizing its columns. Any failure is logged and
/// yields an empty section.
pub async fn fetch_section(client: &Client, section: Section, sheet_id: &str) -> Vec<Record> {
    match client.get_rows(sheet_id).await {
        Ok(rows) => {
            tracing::debug!("Section {} loaded {} rows", section, rows.len());
            normalize_rows(section, rows)
        }
        Err(e) => {
            tracing::warn!("Section {} unavailable, rendering it empty: {}", section, e);
            Vec::new()
        }
    }
}

type FetchFuture = Pin<Box<dyn Future<Output = Vec<Record>> + Send>>;
type FetchFn = dyn Fn(Section, String) -> FetchFuture + Send + Sync;

/// Fans out one fetch per registry entry and joins them all.
pub struct Aggregator {
    fetch: Arc<FetchFn>,
    registry: SourceRegistry,
}

impl Aggregator {
    pub fn new(client: Arc<Client>, registry: SourceRegistry) -> Self {
        Self::with_fetcher(registry, move |section, sheet_id| {
            let client = Arc::clone(&client);
            async move { fetch_section(&client, section, &sheet_id).await }
        })
    }

    /// Uses `fetch` in place of the sheets client for every section.
    pub fn with_fetcher<F, Fut>(registry: SourceRegistry, fetch: F) -> Self
    where
        F: Fn(Section, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<Record>> + Send + 'static,
    {
        Self {
            fetch: Arc::new(move |section, sheet_id| -> FetchFuture {
                Box::pin(fetch(section, sheet_id))
            }),
            registry,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Fetches every registered section concurrently.
    ///
    /// Returns `Err` only when a fetch task itself dies; in that case the
    /// remaining tasks are still awaited and no data is returned.
    pub async fn load(&self) -> Result<PortfolioData, PortfolioError> {
        let mut join_set = JoinSet::new();
        for entry in self.registry.entries() {
            let section = entry.section;
            let pending = (self.fetch)(section, entry.sheet_id.clone());
            join_set.spawn(async move { (section, pending.await) });
        }

        let mut sections = BTreeMap::new();
        let mut failure: Option<String> = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((section, rows)) => {
                    sections.insert(section, rows);
                }
                Err(e) => {
                    tracing::error!("Section fetch task failed: {}", e);
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if let Some(msg) = failure {
            return Err(PortfolioError::Aggregation(msg));
        }

        let loaded = sections.values().filter(|rows| !rows.is_empty()).count();
        tracing::info!(
            "Loaded {} of {} sections with data",
            loaded,
            self.registry.len()
        );
        Ok(PortfolioData { sections })
    }
}

/// Lifecycle of the one-time portfolio load.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<PortfolioData>),
    Failed(String),
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadState::Loading)
    }
}

/// Holds the load state and publishes its single transition.
pub struct PortfolioStore {
    state: watch::Sender<LoadState>,
    started: AtomicBool,
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PortfolioStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            state,
            started: AtomicBool::new(false),
        }
    }

    /// A store that is already `Ready` with the given data.
    pub fn ready(data: PortfolioData) -> Self {
        let store = Self::new();
        store.started.store(true, Ordering::SeqCst);
        store.settle(Ok(data));
        store
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Records the outcome of the load. Only the first call has any effect.
    pub fn settle(&self, result: Result<PortfolioData, PortfolioError>) {
        let next = match result {
            Ok(data) => LoadState::Ready(Arc::new(data)),
            Err(e) => {
                tracing::error!("Failed to load portfolio data: {}", e);
                LoadState::Failed("Failed to load portfolio data".to_string())
            }
        };
        let written = self.state.send_if_modified(|current| {
            if current.is_terminal() {
                return false;
            }
            *current = next;
            true
        });
        if !written {
            tracing::warn!("Portfolio data already settled, ignoring second result");
        }
    }

    /// Runs the aggregation in the background. Returns `None` if a load was
    /// already started on this store.
    pub fn spawn_load(self: &Arc<Self>, aggregator: Aggregator) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Portfolio load already started");
            return None;
        }
        let store = Arc::clone(self);
        Some(tokio::spawn(async move {
            let result = aggregator.load().await;
            store.settle(result);
        }))
    }

    /// Waits until the state is `Ready` or `Failed`.
    pub async fn wait_settled(&self) -> LoadState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(LoadState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_sheet(server: &MockServer, id: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/spreadsheets/d/{}/export", id)))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    fn three_section_registry() -> SourceRegistry {
        SourceRegistry::new([
            (Section::Teaching, "sheet-a".to_string()),
            (Section::Courses, "sheet-b".to_string()),
            (Section::Awards, "sheet-c".to_string()),
        ])
    }

    #[tokio::test]
    async fn failing_section_degrades_to_empty() {
        let server = MockServer::start().await;
        mount_sheet(&server, "sheet-a", 200, "Role,Years\nLecturer,4\n").await;
        mount_sheet(&server, "sheet-b", 500, "boom").await;
        mount_sheet(&server, "sheet-c", 200, "Award,Year\nBest Paper,2022\n").await;

        let aggregator =
            Aggregator::new(Arc::new(Client::with_base_url(&server.uri())), three_section_registry());
        let data = aggregator.load().await.unwrap();

        assert_eq!(data.len(), 3);
        assert_eq!(data.rows(Section::Teaching).len(), 1);
        assert_eq!(data.get(Section::Courses), Some(&[][..]));
        assert_eq!(
            data.rows(Section::Awards)[0].get("Award"),
            Some("Best Paper")
        );
    }

    #[tokio::test]
    async fn failure_isolated_from_other_sections() {
        let server = MockServer::start().await;
        mount_sheet(&server, "sheet-a", 200, "Role\nLecturer\n").await;
        mount_sheet(&server, "sheet-b", 200, "Course\nOS\n").await;
        mount_sheet(&server, "sheet-c", 200, "Award\nX\n").await;
        let healthy = Aggregator::new(Arc::new(Client::with_base_url(&server.uri())), three_section_registry())
            .load()
            .await
            .unwrap();

        let broken_server = MockServer::start().await;
        mount_sheet(&broken_server, "sheet-a", 200, "Role\nLecturer\n").await;
        mount_sheet(&broken_server, "sheet-b", 404, "").await;
        mount_sheet(&broken_server, "sheet-c", 200, "Award\nX\n").await;
        let degraded = Aggregator::new(
            Arc::new(Client::with_base_url(&broken_server.uri())),
            three_section_registry(),
        )
        .load()
        .await
        .unwrap();

        assert_eq!(healthy.get(Section::Teaching), degraded.get(Section::Teaching));
        assert_eq!(healthy.get(Section::Awards), degraded.get(Section::Awards));
        assert!(degraded.rows(Section::Courses).is_empty());
    }

    #[tokio::test]
    async fn contact_columns_normalized_on_ingest() {
        let server = MockServer::start().await;
        mount_sheet(&server, "contact", 200, "MAIL,LinkedIn \nme@uni.edu,https://l.in/me\n").await;

        let registry = SourceRegistry::new([(Section::ContactMe, "contact".to_string())]);
        let data = Aggregator::new(Arc::new(Client::with_base_url(&server.uri())), registry)
            .load()
            .await
            .unwrap();

        let first = data.first(Section::ContactMe).unwrap();
        assert_eq!(first.get("mail"), Some("me@uni.edu"));
        assert_eq!(first.get("linkedin"), Some("https://l.in/me"));
    }

    #[tokio::test]
    async fn store_becomes_ready_after_all_settle() {
        let server = MockServer::start().await;
        mount_sheet(&server, "sheet-a", 200, "Role\nLecturer\n").await;
        mount_sheet(&server, "sheet-b", 500, "").await;
        mount_sheet(&server, "sheet-c", 200, "").await;

        let store = Arc::new(PortfolioStore::new());
        assert!(matches!(store.state(), LoadState::Loading));

        let aggregator =
            Aggregator::new(Arc::new(Client::with_base_url(&server.uri())), three_section_registry());
        let handle = store.spawn_load(aggregator).expect("first load starts");
        let state = store.wait_settled().await;
        handle.await.unwrap();

        match state {
            LoadState::Ready(data) => {
                assert_eq!(data.len(), 3);
                assert!(data.rows(Section::Courses).is_empty());
                assert!(data.rows(Section::Awards).is_empty());
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn load_is_fire_once() {
        let server = MockServer::start().await;
        let registry = SourceRegistry::new([(Section::Teaching, "t".to_string())]);
        mount_sheet(&server, "t", 200, "Role\nLecturer\n").await;

        let store = Arc::new(PortfolioStore::new());
        let first = store.spawn_load(Aggregator::new(
            Arc::new(Client::with_base_url(&server.uri())),
            registry.clone(),
        ));
        let second = store.spawn_load(Aggregator::new(
            Arc::new(Client::with_base_url(&server.uri())),
            registry,
        ));
        assert!(first.is_some());
        assert!(second.is_none());
        first.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn dead_fetch_task_fails_load_after_draining_the_rest() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);
        let aggregator = Aggregator::with_fetcher(three_section_registry(), move |section, _| {
            let counter = Arc::clone(&counter);
            async move {
                if section == Section::Courses {
                    panic!("fetch task died");
                }
                tokio::task::yield_now().await;
                counter.fetch_add(1, Ordering::SeqCst);
                vec![Record::from_pairs([("Title", "kept")])]
            }
        });

        let result = aggregator.load().await;
        assert!(matches!(result, Err(PortfolioError::Aggregation(_))));
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dead_fetch_task_leaves_store_failed() {
        let aggregator = Aggregator::with_fetcher(three_section_registry(), |section, _| async move {
            if section == Section::Awards {
                panic!("fetch task died");
            }
            Vec::new()
        });
        let store = Arc::new(PortfolioStore::new());
        let handle = store.spawn_load(aggregator).expect("first load starts");
        let state = store.wait_settled().await;
        handle.await.unwrap();
        assert!(matches!(state, LoadState::Failed(ref msg) if msg == "Failed to load portfolio data"));
    }

    #[test]
    fn aggregation_failure_moves_to_failed_once() {
        let store = PortfolioStore::new();
        store.settle(Err(PortfolioError::Aggregation("task panicked".into())));
        assert!(matches!(store.state(), LoadState::Failed(_)));

        store.settle(Ok(PortfolioData::default()));
        assert!(matches!(store.state(), LoadState::Failed(_)));
    }

    #[test]
    fn data_serializes_keyed_by_section() {
        let data = PortfolioData::from_sections([(
            Section::Awards,
            vec![Record::from_pairs([("Award", "X")])],
        )]);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["awards"][0]["Award"], "X");
    }
}
