//! Page-by-page product catalog loader with in-memory filtering.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fieldrep_store::models::{CatalogPage, Product};

use crate::pipeline::RequestError;

/// Page size used when a screen does not pick its own.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Backend product listing.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn product_page(&self, page: u32, per_page: u32) -> Result<CatalogPage, RequestError>;
}

// Compile-time assertion: CatalogSource must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CatalogSource) {}
};

/// Why a load request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    LoadInFlight,
    PastLastPage,
    /// Pages are numbered from 1.
    InvalidPage,
}

/// Result of a load request. Failures are absorbed: accumulated items are
/// left untouched and the message is kept in [`CatalogPaginator::last_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { page: u32, items: usize },
    Skipped(SkipReason),
    Failed(String),
}

#[derive(Debug, Default)]
struct PaginatorState {
    items: Vec<Product>,
    /// 0 until the first page arrives.
    current_page: u32,
    last_page: Option<u32>,
    loading: bool,
    last_error: Option<String>,
}

/// Accumulates catalog pages for one screen.
///
/// Only one load runs at a time; requests made meanwhile are skipped, not
/// queued.
pub struct CatalogPaginator {
    source: Arc<dyn CatalogSource>,
    page_size: u32,
    state: Mutex<PaginatorState>,
}

/// Clears the loading flag however the load ends, including when the
/// future is dropped.
struct InFlight<'a> {
    state: &'a Mutex<PaginatorState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

impl CatalogPaginator {
    pub fn new(source: Arc<dyn CatalogSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            state: Mutex::new(PaginatorState::default()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Load page `n`. With `append` the items are added after the ones
    /// already held (no de-duplication); without it they replace them.
    ///
    /// Skipped while another load is running, and for appends past the
    /// known last page. Before any page has arrived the last page is
    /// unknown and nothing is skipped for that reason.
    pub async fn load_page(&self, n: u32, append: bool) -> LoadOutcome {
        {
            let mut state = self.lock();
            if state.loading {
                tracing::debug!(page = n, "page load already in flight, skipping");
                return LoadOutcome::Skipped(SkipReason::LoadInFlight);
            }
            if n == 0 {
                return LoadOutcome::Skipped(SkipReason::InvalidPage);
            }
            if append && state.last_page.is_some_and(|last| n > last) {
                tracing::debug!(page = n, last_page = ?state.last_page, "past last page, skipping");
                return LoadOutcome::Skipped(SkipReason::PastLastPage);
            }
            state.loading = true;
        }
        let guard = InFlight { state: &self.state };

        let result = self.source.product_page(n, self.page_size).await;

        let outcome = {
            let mut state = self.lock();
            match result {
                Ok(page) => {
                    let count = page.items.len();
                    if append {
                        state.items.extend(page.items);
                    } else {
                        state.items = page.items;
                    }
                    state.current_page = page.page_number;
                    state.last_page = Some(page.last_page_number);
                    state.last_error = None;
                    tracing::debug!(
                        page = page.page_number,
                        last_page = page.last_page_number,
                        count,
                        total = state.items.len(),
                        "catalog page loaded"
                    );
                    LoadOutcome::Loaded {
                        page: page.page_number,
                        items: count,
                    }
                }
                Err(e) => {
                    tracing::warn!(page = n, error = %e, "catalog page load failed");
                    let message = e.to_string();
                    state.last_error = Some(message.clone());
                    LoadOutcome::Failed(message)
                }
            }
        };
        drop(guard);
        outcome
    }

    /// Replace everything with page 1.
    pub async fn refresh(&self) -> LoadOutcome {
        self.load_page(1, false).await
    }

    /// Append the next page; the consumer calls this when the user
    /// scrolls near the end.
    pub async fn load_more(&self) -> LoadOutcome {
        let next = {
            let state = self.lock();
            if state.loading {
                return LoadOutcome::Skipped(SkipReason::LoadInFlight);
            }
            if state.current_page == 0 {
                None
            } else if state.last_page.is_some_and(|last| state.current_page >= last) {
                return LoadOutcome::Skipped(SkipReason::PastLastPage);
            } else {
                Some(state.current_page + 1)
            }
        };

        match next {
            Some(page) => self.load_page(page, true).await,
            None => self.refresh().await,
        }
    }

    /// Items already loaded whose name or code contains `text`, ignoring
    /// case. Pages not yet fetched are not searched.
    pub fn filter(&self, text: &str) -> Vec<Product> {
        let needle = text.trim().to_lowercase();
        let state = self.lock();
        if needle.is_empty() {
            return state.items.clone();
        }
        state
            .items
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.code
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    pub fn items(&self) -> Vec<Product> {
        self.lock().items.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Last page loaded, 0 if none.
    pub fn current_page(&self) -> u32 {
        self.lock().current_page
    }

    pub fn last_page(&self) -> Option<u32> {
        self.lock().last_page
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Return `true` if [`Self::load_more`] would fetch something.
    pub fn has_more(&self) -> bool {
        let state = self.lock();
        match state.last_page {
            Some(last) => state.current_page < last,
            None => true,
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PaginatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CatalogPaginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CatalogPaginator")
            .field("page_size", &self.page_size)
            .field("current_page", &state.current_page)
            .field("last_page", &state.last_page)
            .field("items", &state.items.len())
            .finish_non_exhaustive()
    }
}
