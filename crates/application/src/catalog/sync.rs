//! Catalog sync engine.
//!
//! Reconciles the backend catalog with the locally rendered list under a
//! changing filter set. Every load takes a generation number; a response is
//! applied only if its generation is still the newest and the engine is
//! still mounted. Superseded responses are allowed to complete and are then
//! discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use folio_domain::{Book, BookDraft, BookPatch, CatalogState, FiltersPatch, QueryFilters};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::error::{ApiError, ApiResult};
use crate::ports::{BookGateway, TokenSource};

/// Error shown when a load is attempted without a token.
pub const AUTH_REQUIRED: &str = "authentication required";

const LOAD_FAILED: &str = "Failed to load books";
const CREATE_FAILED: &str = "Failed to create book";
const UPDATE_FAILED: &str = "Failed to update book";
const DELETE_FAILED: &str = "Failed to delete book";

/// What became of a load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Items, pagination and filters were replaced.
    Applied,
    /// The request failed; previous items are kept and the error recorded.
    Failed(ApiError),
    /// A newer load started first; the response was discarded.
    Superseded,
    /// No token was present; nothing was sent.
    Unauthenticated,
    /// The engine is not mounted; nothing was sent or applied.
    Unmounted,
}

impl LoadOutcome {
    /// Returns true for `Applied`.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

struct Shared {
    gateway: Arc<dyn BookGateway>,
    tokens: Arc<dyn TokenSource>,
    state: watch::Sender<CatalogState>,
    generation: AtomicU64,
    alive: AtomicBool,
    initial_load: AtomicBool,
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.is_alive() && self.generation.load(Ordering::SeqCst) == generation
    }

    async fn load_with(&self, filters: QueryFilters) -> LoadOutcome {
        if !self.is_alive() {
            return LoadOutcome::Unmounted;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if self.tokens.current_token().is_none() {
            debug!("catalog load refused without a token");
            self.state.send_modify(|state| {
                state.items.clear();
                state.loading = false;
                state.error = Some(AUTH_REQUIRED.to_string());
            });
            return LoadOutcome::Unauthenticated;
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
        debug!(generation, page = filters.page, search = %filters.search, "loading catalog");

        let result = self.gateway.list_books(&filters).await;

        if !self.is_current(generation) {
            debug!(generation, "discarding superseded catalog response");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                debug!(generation, items = page.items.len(), total = page.pagination.total, "catalog loaded");
                self.state.send_modify(|state| {
                    state.items = page.items;
                    state.pagination = page.pagination;
                    state.filters = filters;
                    state.loading = false;
                    state.error = None;
                });
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!(generation, error = %e, "catalog load failed");
                let message = e.user_message(LOAD_FAILED);
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Loads `filters` on behalf of another operation and logs a load that
    /// did not apply. The state carries any error already.
    async fn reload(&self, filters: QueryFilters, after: &'static str) {
        match self.load_with(filters).await {
            LoadOutcome::Applied => {}
            outcome => debug!(after, ?outcome, "reload not applied"),
        }
    }

    fn record_error(&self, error: &ApiError, fallback: &str) {
        if !self.is_alive() {
            return;
        }
        let message = error.user_message(fallback);
        self.state.send_modify(|state| state.error = Some(message));
    }
}

/// The data-sync engine behind a catalog view.
///
/// Observers follow [`subscribe`](Self::subscribe); intents go through the
/// async operations. Filters are only committed by a successful load, except
/// through [`set_filters`](Self::set_filters).
pub struct CatalogSync {
    shared: Arc<Shared>,
    search: Debouncer,
}

impl CatalogSync {
    /// Creates an unmounted engine with default filters of `page_limit` items.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn BookGateway>,
        tokens: Arc<dyn TokenSource>,
        page_limit: u32,
        search_debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(CatalogState::with_filters(QueryFilters::with_limit(page_limit)));
        Self {
            shared: Arc::new(Shared {
                gateway,
                tokens,
                state,
                generation: AtomicU64::new(0),
                alive: AtomicBool::new(false),
                initial_load: AtomicBool::new(false),
            }),
            search: Debouncer::new(search_debounce),
        }
    }

    /// Marks the engine live and performs the initial load.
    ///
    /// The initial load happens at most once per engine, and only when a
    /// token is present; later mounts only restore liveness.
    pub async fn mount(&self) -> Option<LoadOutcome> {
        self.shared.alive.store(true, Ordering::SeqCst);
        if self.shared.tokens.current_token().is_none() {
            return None;
        }
        if self
            .shared
            .initial_load
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        info!("catalog mounted, running initial load");
        Some(self.load(None).await)
    }

    /// Detaches the engine. In-flight responses are discarded, a pending
    /// search is cancelled and the loading flag is cleared.
    pub fn unmount(&self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if self.search.cancel() {
            debug!("pending search cancelled on unmount");
        }
        self.shared.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }

    /// Whether the engine is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.shared.is_alive()
    }

    /// Loads with `overrides` merged onto the current filters.
    ///
    /// The merged filters become current only if this load is applied.
    pub async fn load(&self, overrides: Option<FiltersPatch>) -> LoadOutcome {
        let filters = {
            let state = self.shared.state.borrow();
            overrides.map_or_else(|| state.filters.clone(), |patch| state.filters.merge(&patch))
        };
        self.shared.load_with(filters).await
    }

    /// Merges `patch` onto the current filters without loading.
    ///
    /// Returns false, and notifies nobody, if the result equals the current
    /// filters.
    pub fn set_filters(&self, patch: &FiltersPatch) -> bool {
        self.shared.state.send_if_modified(|state| {
            let merged = state.filters.merge(patch);
            if merged == state.filters {
                return false;
            }
            state.filters = merged;
            true
        })
    }

    /// Commits a search term once input has been quiet for the debounce
    /// period, then loads the first page for it.
    ///
    /// Each call restarts the quiet period. A term equal to the committed
    /// search does not load.
    pub fn search(&self, text: impl Into<String>) {
        let text = text.into();
        let shared = Arc::clone(&self.shared);
        self.search.schedule(async move {
            let filters = {
                let state = shared.state.borrow();
                if state.filters.search == text {
                    return;
                }
                state.filters.merge(&FiltersPatch::search(text))
            };
            shared.reload(filters, "search").await;
        });
    }

    /// Whether a search is waiting for its quiet period.
    #[must_use]
    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// Loads `page` with the other filters unchanged.
    pub async fn set_page(&self, page: u32) -> LoadOutcome {
        self.load(Some(FiltersPatch::page(page))).await
    }

    /// Creates a book, then reloads with the filters active at call time.
    ///
    /// Returns true if the backend accepted the book.
    pub async fn create(&self, draft: &BookDraft) -> bool {
        let filters = self.filters();
        match self.shared.gateway.create_book(draft).await {
            Ok(book) => {
                info!(id = %book.id, title = %book.title, "book created");
                self.shared.reload(filters, "create").await;
                true
            }
            Err(e) => {
                warn!(error = %e, "create failed");
                self.shared.record_error(&e, CREATE_FAILED);
                false
            }
        }
    }

    /// Updates a book, then reloads with the filters active at call time.
    ///
    /// Returns true if the backend accepted the change. An empty patch is
    /// accepted without a request.
    pub async fn update(&self, id: &str, patch: &BookPatch) -> bool {
        if patch.is_empty() {
            return true;
        }
        let filters = self.filters();
        match self.shared.gateway.update_book(id, patch).await {
            Ok(book) => {
                info!(id = %book.id, "book updated");
                self.shared.reload(filters, "update").await;
                true
            }
            Err(e) => {
                warn!(id, error = %e, "update failed");
                self.shared.record_error(&e, UPDATE_FAILED);
                false
            }
        }
    }

    /// Deletes a book, removing it from the list before the request is sent.
    ///
    /// On failure the item goes back to its previous position, unless a load
    /// has replaced the list since, the item is back already, or the backend
    /// reported it missing.
    pub async fn delete(&self, id: &str) -> bool {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        let mut removed: Option<(usize, Book)> = None;
        self.shared.state.send_if_modified(|state| {
            let Some(index) = state.items.iter().position(|b| b.id == id) else {
                return false;
            };
            removed = Some((index, state.items.remove(index)));
            true
        });

        match self.shared.gateway.delete_book(id).await {
            Ok(()) => {
                info!(id, "book deleted");
                true
            }
            Err(e) => {
                warn!(id, error = %e, "delete failed");
                let rollback = removed.filter(|_| !e.is_not_found() && self.shared.is_current(generation));
                let message = e.user_message(DELETE_FAILED);
                if self.shared.is_alive() {
                    self.shared.state.send_modify(|state| {
                        if let Some((index, book)) = rollback
                            && state.item(&book.id).is_none()
                        {
                            let index = index.min(state.items.len());
                            state.items.insert(index, book);
                        }
                        state.error = Some(message);
                    });
                }
                false
            }
        }
    }

    /// Fetches one book without touching the list.
    ///
    /// # Errors
    ///
    /// Returns the API error; `NotFound` if the id is unknown.
    pub async fn fetch(&self, id: &str) -> ApiResult<Book> {
        self.shared.gateway.get_book(id).await
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.shared.state.borrow().clone()
    }

    /// Current committed filters.
    #[must_use]
    pub fn filters(&self) -> QueryFilters {
        self.shared.state.borrow().filters.clone()
    }

    /// Follows state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.shared.state.subscribe()
    }
}
