//! Screen composition.
//!
//! [`CatalogView`] binds the page controller, the filter state and the
//! cached catalog reads into one [`ViewState`]. Navigation and filter edits
//! are synchronous; fetching happens in [`CatalogView::load`] and
//! [`CatalogView::retry`].

use std::fmt;

use showcase_cache::{CatalogQueries, PageRequest, QueryState, QueryStatus};
use showcase_core::{Category, CategorySlug, Product, ProductId, ProductPage};
use tokio::sync::watch;
use tracing::debug;

use crate::error::{ViewError, ViewResult};
use crate::filter::{ChipKind, FilterChip, FilterState, SortDirection, SortField};
use crate::modal::DetailModal;
use crate::pagination::{PageControls, PaginationController};

/// Shown in place of the listing after an unrecovered failure.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load products. Please try again.";

/// Heading of the empty state.
pub const EMPTY_TITLE: &str = "No products found";

/// Hint under the empty state heading.
pub const EMPTY_HINT: &str = "Try adjusting your filters or search terms";

/// Counts above the grid.
///
/// `shown` counts the filtered current page while `total` is the server
/// total, so search and sort narrow only what the current page holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub shown: usize,
    pub total: u64,
    /// Display name of the selected category.
    pub category: Option<String>,
    pub search: Option<String>,
    /// Search or sort is active and only sees the current page.
    pub page_scoped: bool,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {} products", self.shown, self.total)?;
        if let Some(category) = &self.category {
            write!(f, " in \"{category}\"")?;
        }
        if let Some(search) = &self.search {
            write!(f, " matching \"{search}\"")?;
        }
        Ok(())
    }
}

/// The product grid and everything around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub products: Vec<Product>,
    pub summary: Summary,
    pub chips: Vec<FilterChip>,
    /// `None` when everything fits on one page.
    pub controls: Option<PageControls>,
    /// A background re-fetch of stale data is running.
    pub is_refreshing: bool,
}

/// The error screen. Filters and pagination are hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub message: &'static str,
    /// The underlying failure, for logs and verbose output.
    pub cause: Option<String>,
}

/// What the screen shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// First fetch for the current window is in flight.
    Loading,
    /// The current window failed. Offer [`CatalogView::retry`].
    Error(ErrorView),
    /// Nothing on this page matches the filters.
    Empty(Listing),
    Ready(Listing),
}

impl ViewState {
    pub fn listing(&self) -> Option<&Listing> {
        match self {
            ViewState::Empty(listing) | ViewState::Ready(listing) => Some(listing),
            ViewState::Loading | ViewState::Error(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }
}

/// One browsing session over the catalog.
pub struct CatalogView {
    queries: CatalogQueries,
    pagination: PaginationController,
    filters: FilterState,
    modal: DetailModal,
    /// Window that `page` was resolved for.
    request: PageRequest,
    page: QueryState<ProductPage>,
    categories: QueryState<Vec<Category>>,
}

impl CatalogView {
    pub fn new(queries: CatalogQueries, pagination: PaginationController) -> Self {
        let window = pagination.window();
        Self {
            queries,
            request: PageRequest::new(None, window.limit, window.skip),
            pagination,
            filters: FilterState::default(),
            modal: DetailModal::default(),
            page: QueryState::idle(),
            categories: QueryState::idle(),
        }
    }

    pub fn queries(&self) -> &CatalogQueries {
        &self.queries
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn modal(&self) -> &DetailModal {
        &self.modal
    }

    /// Loaded categories, empty until the list arrives.
    pub fn categories(&self) -> &[Category] {
        self.categories.data.as_deref().unwrap_or_default()
    }

    /// Wait for the category list, fetching it if needed.
    pub async fn load_categories(&mut self) -> &[Category] {
        self.categories = self.queries.categories().await;
        self.categories()
    }

    /// The request the current page and filters map to.
    ///
    /// A selected category scopes the fetch server-side.
    pub fn current_request(&self) -> PageRequest {
        let window = self.pagination.window();
        PageRequest::new(Some(self.filters.category.clone()), window.limit, window.skip)
    }

    /// Fetch whatever the current window needs and render it.
    ///
    /// The category list is fetched in the background on first use and
    /// never holds up the page. A failed list is only retried by
    /// [`CatalogView::retry`] or [`CatalogView::load_categories`].
    pub async fn load(&mut self) -> ViewState {
        if self.queries.categories_snapshot().status == QueryStatus::Idle {
            self.spawn_categories(false);
        }
        let request = self.current_request();
        let state = self.queries.page(&request).await;
        self.accept(request, state);
        self.categories = self.queries.categories_snapshot();
        self.render()
    }

    /// Re-fetch the current window, bypassing staleness.
    pub async fn retry(&mut self) -> ViewState {
        if self.queries.categories_snapshot().is_error() {
            self.spawn_categories(true);
        }
        let request = self.current_request();
        let state = self.queries.refetch_page(&request).await;
        self.accept(request, state);
        self.categories = self.queries.categories_snapshot();
        self.render()
    }

    fn spawn_categories(&self, force: bool) {
        let queries = self.queries.clone();
        tokio::spawn(async move {
            if force {
                queries.refetch_categories().await;
            } else {
                queries.categories().await;
            }
        });
    }

    /// Record a resolved page. A page for a window the user has since left
    /// is ignored; returns whether it was taken.
    pub fn accept(&mut self, request: PageRequest, state: QueryState<ProductPage>) -> bool {
        if request != self.current_request() {
            debug!(key = %request.key(), "ignoring page for a window no longer shown");
            return false;
        }
        self.request = request;
        self.page = state;
        true
    }

    /// Pull the latest cached state for the current window without fetching.
    pub fn sync(&mut self) {
        let request = self.current_request();
        self.page = self.queries.page_snapshot(&request);
        self.request = request;
        self.categories = self.queries.categories_snapshot();
    }

    /// Watch the current window for background updates.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<ProductPage>> {
        self.queries.subscribe_page(&self.current_request())
    }

    /// Compose the screen from the current state.
    pub fn render(&self) -> ViewState {
        let page = self.shown_page();
        if page.is_error() {
            return ViewState::Error(ErrorView {
                message: LOAD_ERROR_MESSAGE,
                cause: page.error.as_ref().map(ToString::to_string),
            });
        }
        let Some(data) = page.data.as_ref() else {
            return ViewState::Loading;
        };

        let products = self.filters.apply(&data.products);
        let listing = Listing {
            summary: self.summary(products.len(), data.total),
            chips: self.filters.chips(),
            controls: self.pagination.controls(data.total),
            is_refreshing: page.is_fetching,
            products,
        };
        if listing.products.is_empty() {
            ViewState::Empty(listing)
        } else {
            ViewState::Ready(listing)
        }
    }

    /// State of the window the controls point at. Falls back to the cache
    /// when the last resolved page belongs to a window the user has left.
    fn shown_page(&self) -> QueryState<ProductPage> {
        let current = self.current_request();
        if self.request == current {
            self.page.clone()
        } else {
            self.queries.page_snapshot(&current)
        }
    }

    fn summary(&self, shown: usize, total: u64) -> Summary {
        let category = (!self.filters.category.is_empty()).then(|| {
            Category::find(self.categories(), &self.filters.category)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| self.filters.category.to_string())
        });
        let search = (!self.filters.search_term.is_empty()).then(|| self.filters.search_term.clone());
        Summary {
            shown,
            total,
            category,
            search,
            page_scoped: self.filters.is_page_scoped(),
        }
    }

    /// Server total of the shown window, if it has loaded.
    fn server_total(&self) -> Option<u64> {
        self.shown_page().data.map(|p| p.total)
    }

    pub fn go_to_page(&mut self, n: u32) -> ViewResult<()> {
        self.pagination.go_to_page(n)
    }

    /// Returns `false` on the last page.
    pub fn next_page(&mut self) -> ViewResult<bool> {
        let Some(next) = self.controls().and_then(|c| c.next()) else {
            return Ok(false);
        };
        self.go_to_page(next).map(|()| true)
    }

    /// Returns `false` on the first page.
    pub fn prev_page(&mut self) -> ViewResult<bool> {
        let Some(prev) = self.controls().and_then(|c| c.prev()) else {
            return Ok(false);
        };
        self.go_to_page(prev).map(|()| true)
    }

    pub fn first_page(&mut self) -> ViewResult<()> {
        self.go_to_page(1)
    }

    /// Returns `false` when the page count is not known yet.
    pub fn last_page(&mut self) -> ViewResult<bool> {
        let Some(controls) = self.controls() else {
            return Ok(false);
        };
        self.go_to_page(controls.total_pages).map(|()| true)
    }

    fn controls(&self) -> Option<PageControls> {
        self.server_total().and_then(|total| self.pagination.controls(total))
    }

    /// Select a category, or clear it with an empty slug. Changing the
    /// category returns to page 1.
    pub fn set_category(&mut self, slug: CategorySlug) {
        if self.filters.set_category(slug) {
            self.pagination.reset_on_filter_change();
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filters.set_search(term);
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.filters.set_sort(field, direction);
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.filters.set_sort_direction(direction);
    }

    pub fn clear_filters(&mut self) {
        if self.filters.reset() {
            self.pagination.reset_on_filter_change();
        }
    }

    pub fn remove_chip(&mut self, kind: ChipKind) {
        if self.filters.remove_chip(kind) {
            self.pagination.reset_on_filter_change();
        }
    }

    /// Open the detail modal for a product.
    pub fn show_details(&mut self, product: Product) {
        debug!(id = %product.id, "opening product details");
        self.modal.show(product);
    }

    /// Open the detail modal for a product in the visible listing.
    pub fn show_details_by_id(&mut self, id: ProductId) -> ViewResult<()> {
        let state = self.render();
        let product = state
            .listing()
            .and_then(|listing| listing.products.iter().find(|p| p.id == id))
            .cloned()
            .ok_or(ViewError::NotOnPage(id.get()))?;
        self.show_details(product);
        Ok(())
    }

    pub fn close_details(&mut self) {
        self.modal.close();
    }

    /// Window regained focus.
    pub fn focus(&self) -> usize {
        self.queries.focus()
    }
}
