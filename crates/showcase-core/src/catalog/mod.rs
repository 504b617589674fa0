//! Catalog records as served by the remote product API.
//!
//! Records are immutable once fetched; the query cache owns them for the
//! lifetime of their cache entry and hands out clones.

mod category;
mod page;
mod product;

pub use category::Category;
pub use page::ProductPage;
pub use product::{Product, Review};
