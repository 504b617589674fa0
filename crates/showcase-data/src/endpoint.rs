//! Catalog endpoints.

use std::fmt;

use showcase_core::{CategorySlug, ProductId};

/// One of the four read endpoints of the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint<'a> {
    /// `GET /products?limit&skip`
    ListProducts { limit: u32, skip: u32 },
    /// `GET /products/{id}`
    GetProduct(ProductId),
    /// `GET /products/categories`
    ListCategories,
    /// `GET /products/category/{slug}?limit&skip`
    ListProductsByCategory {
        slug: &'a CategorySlug,
        limit: u32,
        skip: u32,
    },
}

impl Endpoint<'_> {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListProducts { .. } => "list_products",
            Self::GetProduct(_) => "get_product",
            Self::ListCategories => "list_categories",
            Self::ListProductsByCategory { .. } => "list_products_by_category",
        }
    }

    /// Path segments below the base URL. Segments are escaped when joined.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::ListProducts { .. } => vec!["products".to_string()],
            Self::GetProduct(id) => vec!["products".to_string(), id.to_string()],
            Self::ListCategories => vec!["products".to_string(), "categories".to_string()],
            Self::ListProductsByCategory { slug, .. } => vec![
                "products".to_string(),
                "category".to_string(),
                slug.as_str().to_string(),
            ],
        }
    }

    /// The `limit`/`skip` window for paged endpoints.
    pub fn window(&self) -> Option<(u32, u32)> {
        match self {
            Self::ListProducts { limit, skip } | Self::ListProductsByCategory { limit, skip, .. } => {
                Some((*limit, *skip))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments().join("/"))?;
        if let Some((limit, skip)) = self.window() {
            write!(f, "?limit={}&skip={}", limit, skip)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_paths() {
        let slug = CategorySlug::from("smartphones");
        assert_eq!(
            Endpoint::ListProducts { limit: 30, skip: 60 }.to_string(),
            "/products?limit=30&skip=60"
        );
        assert_eq!(Endpoint::GetProduct(ProductId::new(5)).to_string(), "/products/5");
        assert_eq!(Endpoint::ListCategories.to_string(), "/products/categories");
        assert_eq!(
            Endpoint::ListProductsByCategory { slug: &slug, limit: 30, skip: 0 }.to_string(),
            "/products/category/smartphones?limit=30&skip=0"
        );
    }

    #[test]
    fn test_window_only_on_paged_endpoints() {
        assert_eq!(Endpoint::ListProducts { limit: 0, skip: 0 }.window(), Some((0, 0)));
        assert_eq!(Endpoint::ListCategories.window(), None);
        assert_eq!(Endpoint::GetProduct(ProductId::new(1)).name(), "get_product");
    }
}
