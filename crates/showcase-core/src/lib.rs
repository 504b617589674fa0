//! Catalog data model, errors and configuration for the product showcase.
//!
//! This crate provides:
//! - `Product`, `ProductPage`, `Category` - Immutable records fetched from the remote catalog
//! - `ProductId`, `CategorySlug` - Typed identifiers
//! - `CatalogError` - The normalized error crossing every crate boundary
//! - `Money` - Cents-based price display
//! - `ShowcaseConfig` - Runtime configuration loaded from TOML or JSON

pub mod catalog;
mod config;
mod error;
mod ids;
mod money;

pub use catalog::{Category, Product, ProductPage, Review};
pub use config::*;
pub use error::*;
pub use ids::*;
pub use money::Money;

/// Number of products requested per server page.
pub const PAGE_SIZE: u32 = 30;
