//! Product categories.

use crate::ids::CategorySlug;
use serde::{Deserialize, Serialize};

/// A category from the fixed remote vocabulary. Identity is the slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// URL-friendly identifier, e.g. "home-decoration".
    pub slug: CategorySlug,
    /// Display name, e.g. "Home Decoration".
    pub name: String,
    /// Catalog URL listing the category's products.
    #[serde(default)]
    pub url: String,
}

impl Category {
    /// Create a category.
    pub fn new(slug: impl Into<CategorySlug>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            url: String::new(),
        }
    }

    /// Look up a category by slug.
    pub fn find<'a>(categories: &'a [Category], slug: &CategorySlug) -> Option<&'a Category> {
        categories.iter().find(|c| &c.slug == slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_category_list() {
        let categories: Vec<Category> = serde_json::from_str(
            r#"[{"slug":"beauty","name":"Beauty","url":"https://dummyjson.com/products/category/beauty"},
                {"slug":"fragrances","name":"Fragrances","url":"https://dummyjson.com/products/category/fragrances"}]"#,
        )
        .unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].slug.as_str(), "fragrances");
    }

    #[test]
    fn test_find_by_slug() {
        let categories = vec![Category::new("beauty", "Beauty"), Category::new("laptops", "Laptops")];
        let found = Category::find(&categories, &CategorySlug::from("laptops")).unwrap();
        assert_eq!(found.name, "Laptops");
        assert!(Category::find(&categories, &CategorySlug::from("cars")).is_none());
    }
}
