//! Cache key composition.

use std::fmt;

use serde::{Deserialize, Serialize};
use showcase_core::{CategorySlug, ProductId};

/// Identifies one cached query by its parameters.
///
/// Two requests with the same parameters share a key and therefore one
/// cache entry and at most one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key.
    components: Vec<String>,
}

impl QueryKey {
    /// Build a key from its components.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        Self {
            key: components.join(":"),
            components,
        }
    }

    /// `products:{limit}:{skip}`
    pub fn products(limit: u32, skip: u32) -> Self {
        Self::new(["products".to_string(), limit.to_string(), skip.to_string()])
    }

    /// `products:category:{slug}:{limit}:{skip}`
    pub fn products_by_category(slug: &CategorySlug, limit: u32, skip: u32) -> Self {
        Self::new([
            "products".to_string(),
            "category".to_string(),
            slug.to_string(),
            limit.to_string(),
            skip.to_string(),
        ])
    }

    /// `product:{id}`
    pub fn product(id: ProductId) -> Self {
        Self::new(["product".to_string(), id.to_string()])
    }

    /// `categories`
    pub fn categories() -> Self {
        Self::new(["categories"])
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components.
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
