//! Debounced incremental search over doctors and chemists.
//!
//! Each keystroke restarts a debounce timer; only the text present when the
//! timer fires is searched. Every issued search takes the next value of a
//! generation counter, and with [`ResponseOrdering::LatestIssued`] a
//! response is applied only if no newer search (or clear) has happened
//! since. [`ResponseOrdering::LastArrival`] lets stale responses through but
//! still drops any that were issued before a clear. State is published on a
//! `watch` channel.
//!
//! All methods spawn onto the current Tokio runtime and must be called from
//! within one.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use fieldrep_store::models::{EntityId, Person, PersonKind};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::PeopleLists;
use crate::pipeline::RequestError;

/// Quiet period after the last keystroke before searching.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shorter queries never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;

/// Delay between losing focus and hiding results, so a tap on a result
/// still lands.
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// Backend search.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn search_people(&self, text: &str) -> Result<PeopleLists, RequestError>;
}

// Compile-time assertion: EntitySource must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn EntitySource) {}
};

/// Which of several overlapping responses ends up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Only the most recently issued search may update results.
    #[default]
    LatestIssued,
    /// Whatever response arrives last wins, even a stale one. Responses to
    /// searches issued before the query was cleared or a result picked are
    /// still dropped.
    LastArrival,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub debounce: Duration,
    pub min_query_chars: usize,
    pub blur_grace: Duration,
    pub ordering: ResponseOrdering,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_chars: MIN_QUERY_CHARS,
            blur_grace: BLUR_GRACE,
            ordering: ResponseOrdering::default(),
        }
    }
}

/// What a search box shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: PeopleLists,
    /// At least one search is in flight.
    pub loading: bool,
    pub results_visible: bool,
    /// Message of the last failed search, cleared by the next success.
    pub error: Option<String>,
}

#[derive(Default)]
struct Timers {
    debounce: Option<CancellationToken>,
    blur: Option<CancellationToken>,
}

struct Inner {
    source: Arc<dyn EntitySource>,
    config: SearchConfig,
    state: watch::Sender<SearchState>,
    timers: Mutex<Timers>,
    generation: AtomicU64,
    /// Bumped whenever results are cleared.
    clears: AtomicU64,
    in_flight: AtomicUsize,
    shutdown: CancellationToken,
}

pub struct EntitySearchController {
    inner: Arc<Inner>,
}

impl EntitySearchController {
    pub fn new(source: Arc<dyn EntitySource>) -> Self {
        Self::with_config(source, SearchConfig::default())
    }

    pub fn with_config(source: Arc<dyn EntitySource>, config: SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                state,
                timers: Mutex::new(Timers::default()),
                generation: AtomicU64::new(0),
                clears: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Number of searches issued so far, including ones whose responses
    /// were discarded.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Handle new input text.
    ///
    /// Text shorter than the minimum clears results at once and searches
    /// nothing. Otherwise the debounce timer restarts.
    pub fn on_query_change(&self, text: &str) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        let text = text.to_string();
        self.inner.cancel_debounce();
        self.inner.state.send_modify(|s| s.query = text.clone());

        if text.trim().chars().count() < self.inner.config.min_query_chars {
            self.inner.discard_pending();
            self.inner.state.send_modify(|s| {
                s.results = PeopleLists::default();
                s.results_visible = false;
                s.error = None;
            });
            return;
        }

        let token = self.inner.shutdown.child_token();
        self.inner.timers().debounce = Some(token.clone());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(inner.config.debounce) => {}
            }
            if token.is_cancelled() {
                return;
            }
            inner.run_search(text).await;
        });
    }

    /// Pick a visible result. Clears the query and hides the list.
    ///
    /// Returns `None` if no such result is visible.
    pub fn select(&self, kind: PersonKind, id: EntityId) -> Option<Person> {
        let picked = {
            let state = self.inner.state.borrow();
            if !state.results_visible {
                return None;
            }
            match kind {
                PersonKind::Doctor => state.results.find_doctor(id).cloned().map(Person::from),
                PersonKind::Chemist => state.results.find_chemist(id).cloned().map(Person::from),
            }
        }?;

        self.inner.cancel_debounce();
        self.inner.cancel_blur();
        self.inner.discard_pending();
        self.inner.state.send_modify(|s| {
            s.query.clear();
            s.results = PeopleLists::default();
            s.results_visible = false;
        });
        tracing::debug!(kind = %kind, id, "search result selected");
        Some(picked)
    }

    /// The input lost focus: hide results after the grace delay.
    pub fn on_blur(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.cancel_blur();
        let token = self.inner.shutdown.child_token();
        self.inner.timers().blur = Some(token.clone());

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(inner.config.blur_grace) => {
                    if !token.is_cancelled() {
                        inner.state.send_modify(|s| s.results_visible = false);
                    }
                }
            }
        });
    }

    /// The input regained focus: keep results up and show any that exist.
    pub fn on_focus(&self) {
        self.inner.cancel_blur();
        self.inner.state.send_if_modified(|s| {
            let show = !s.results.is_empty() && !s.results_visible;
            if show {
                s.results_visible = true;
            }
            show
        });
    }

    /// Stop all timers and ignore responses still in flight.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.discard_pending();
    }
}

impl Drop for EntitySearchController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for EntitySearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySearchController")
            .field("config", &self.inner.config)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn timers(&self) -> std::sync::MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_debounce(&self) {
        if let Some(token) = self.timers().debounce.take() {
            token.cancel();
        }
    }

    fn cancel_blur(&self) {
        if let Some(token) = self.timers().blur.take() {
            token.cancel();
        }
    }

    /// Make every in-flight response stale, under either ordering.
    fn discard_pending(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    async fn run_search(&self, text: String) {
        let clears = self.clears.load(Ordering::SeqCst);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.loading = true);
        tracing::debug!(generation, query = %text, "searching people");

        let result = self.source.search_people(&text).await;

        let remaining = self
            .in_flight
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);
        let latest = self.generation.load(Ordering::SeqCst);
        let apply = !self.shutdown.is_cancelled()
            && match self.config.ordering {
                ResponseOrdering::LatestIssued => generation == latest,
                ResponseOrdering::LastArrival => self.clears.load(Ordering::SeqCst) == clears,
            };

        if !apply {
            tracing::debug!(generation, latest, query = %text, "discarding stale search response");
        }

        self.state.send_modify(|s| {
            s.loading = remaining > 0;
            if !apply {
                return;
            }
            match result {
                Ok(results) => {
                    s.results = results;
                    s.error = None;
                }
                Err(e) => {
                    tracing::warn!(query = %text, error = %e, "people search failed");
                    s.results = PeopleLists::default();
                    s.error = Some(e.to_string());
                }
            }
            s.results_visible = true;
        });
    }
}
