//! Keyed query cache with staleness windows, coalescing and retries.
//!
//! This crate provides:
//! - `QueryKey` - Cache key derived from request parameters
//! - `QueryPolicy` - Staleness window, retry budget and focus behaviour per query family
//! - `QueryCache` - Key to entry map with in-flight coalescing and stale-while-revalidate
//! - `QueryState` - The observable `{status, data, error}` unit handed to subscribers
//! - `QueryEvent` - Broadcast stream of fetch failures and settlements
//! - `CatalogQueries` - The catalog's four reads wired through their caches
//!
//! # Example
//!
//! ```ignore
//! let queries = CatalogQueries::new(Arc::new(client), &config.cache);
//!
//! // First call fetches; calls within five minutes are served from memory.
//! let state = queries.page(&PageRequest::new(None, 30, 0)).await;
//! if let Some(page) = state.data {
//!     println!("{} of {}", page.products.len(), page.total);
//! }
//! ```

mod cache;
mod event;
mod key;
mod policy;
mod queries;
mod state;

pub use cache::*;
pub use event::*;
pub use key::*;
pub use policy::*;
pub use queries::*;
pub use state::*;
