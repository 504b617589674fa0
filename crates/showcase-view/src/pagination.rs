//! Page index state and the server fetch window derived from it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use showcase_core::PAGE_SIZE;
use tracing::debug;

use crate::error::{ViewError, ViewResult};

/// Host surface that reacts to page changes.
pub trait Viewport: Send + Sync {
    /// Smoothly scroll the listing back to the top.
    fn scroll_to_top(&self);
}

/// Viewport with nothing to scroll.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn scroll_to_top(&self) {}
}

/// Server offset/limit pair for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchWindow {
    pub skip: u32,
    pub limit: u32,
}

/// Owns the current page index.
///
/// The page is always at least 1 and the page size never changes after
/// construction, so the fetch window is a pure function of the page.
#[derive(Clone)]
pub struct PaginationController {
    current_page: u32,
    page_size: u32,
    viewport: Arc<dyn Viewport>,
}

impl fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginationController")
            .field("current_page", &self.current_page)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl PaginationController {
    /// Start on page 1. A zero page size falls back to the default.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: if page_size == 0 { PAGE_SIZE } else { page_size },
            viewport: Arc::new(NoopViewport),
        }
    }

    /// Attach the viewport scrolled on navigation.
    pub fn with_viewport(mut self, viewport: Arc<dyn Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The server window for the current page.
    pub fn window(&self) -> FetchWindow {
        // go_to_page only admits pages whose offset fits.
        FetchWindow {
            skip: (self.current_page - 1).saturating_mul(self.page_size),
            limit: self.page_size,
        }
    }

    /// Navigate to page `n` and scroll to the top.
    pub fn go_to_page(&mut self, n: u32) -> ViewResult<()> {
        if n < 1 {
            return Err(ViewError::InvalidPage(n));
        }
        if (n - 1).checked_mul(self.page_size).is_none() {
            return Err(ViewError::PageOutOfRange(n));
        }
        debug!(from = self.current_page, to = n, "page change");
        self.current_page = n;
        self.viewport.scroll_to_top();
        Ok(())
    }

    /// Back to page 1 after the underlying collection changed.
    pub fn reset_on_filter_change(&mut self) {
        self.current_page = 1;
    }

    /// Number of pages for a server-reported total.
    pub fn total_pages(&self, server_total: u64) -> u32 {
        total_pages(server_total, self.page_size)
    }

    /// Navigation controls, or `None` when there is at most one page.
    pub fn controls(&self, server_total: u64) -> Option<PageControls> {
        let total_pages = self.total_pages(server_total);
        (total_pages > 1).then(|| PageControls::new(self.current_page, total_pages))
    }
}

/// `ceil(server_total / page_size)`; zero items means zero pages.
pub fn total_pages(server_total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = server_total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// First/previous/next/last navigation for a multi-page listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageControls {
    /// Current page (1-indexed).
    pub page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageControls {
    pub fn new(page: u32, total_pages: u32) -> Self {
        Self {
            page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Page numbers to display around the current page.
    pub fn page_numbers(&self, max_visible: usize) -> Vec<u32> {
        let max_visible = u32::try_from(max_visible).unwrap_or(u32::MAX);
        if self.total_pages <= max_visible {
            return (1..=self.total_pages).collect();
        }
        if max_visible == 0 {
            return Vec::new();
        }

        let half = max_visible / 2;
        let start = self.page.saturating_sub(half).max(1);
        let end = (start + max_visible - 1).min(self.total_pages);
        let start = (end + 1).saturating_sub(max_visible).max(1);

        (start..=end).collect()
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    pub fn next(&self) -> Option<u32> {
        self.has_next.then_some(self.page + 1)
    }

    pub fn prev(&self) -> Option<u32> {
        self.has_prev.then(|| self.page - 1)
    }
}
