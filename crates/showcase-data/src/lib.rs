//! Remote catalog client with timeouts and retry policy.
//!
//! This crate provides:
//! - `CatalogApi` - The four read operations against the remote catalog
//! - `HttpCatalogClient` - `CatalogApi` over HTTP with a transport timeout
//! - `Endpoint` - Typed request descriptions used for URLs and log fields
//! - `TimeoutConfig` - Connect/total transport timeouts
//! - `RetryPolicy` - Retry budget and backoff, applied by the caller layer

mod client;
mod endpoint;
mod normalize;
mod retry;
mod timeout;

pub use client::*;
pub use endpoint::*;
pub use normalize::*;
pub use retry::*;
pub use timeout::*;
