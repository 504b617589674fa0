//! Pagination, filtering and screen composition for the product showcase.
//!
//! - `PaginationController` - Page index and the server fetch window it implies
//! - `FilterState` - Category, search and sort selections plus the page-local filter pass
//! - `CatalogView` - Binds both to the cached catalog reads and renders a `ViewState`
//! - `DetailModal` - Single-product detail dialog state
//! - `ErrorBoundary` - Turns failed fetch attempts into toasts

mod error;
mod filter;
mod modal;
mod notify;
mod pagination;
mod view;

pub use error::*;
pub use filter::*;
pub use modal::*;
pub use notify::*;
pub use pagination::*;
pub use view::*;
