//! One server page of products.

use super::Product;
use serde::{Deserialize, Serialize};

/// A window of products plus the server's count of all matching items.
///
/// `total` is scoped to the whole remote collection (or the whole category
/// for category-scoped requests), never to this page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl ProductPage {
    /// Number of products in this page.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether this page holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
