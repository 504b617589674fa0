//! User-editable filter state and the page-local filter/sort pass.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use showcase_core::{CategorySlug, Product};

/// Field the visible list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    /// Keep server order.
    #[default]
    None,
    Price,
    Title,
    Rating,
}

impl SortField {
    /// All fields a user can pick, in menu order.
    pub const SELECTABLE: [SortField; 3] = [SortField::Price, SortField::Title, SortField::Rating];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::None => "none",
            SortField::Price => "price",
            SortField::Title => "title",
            SortField::Rating => "rating",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortField::None => "None",
            SortField::Price => "Price",
            SortField::Title => "Title",
            SortField::Rating => "Rating",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::None => Ordering::Equal,
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Rating => a.rating.total_cmp(&b.rating),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortField::None),
            "price" => Ok(SortField::Price),
            "title" => Ok(SortField::Title),
            "rating" => Ok(SortField::Rating),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

/// Sort direction. Only meaningful when a sort field is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "Ascending",
            SortDirection::Descending => "Descending",
        }
    }

    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Which part of the filter state a chip represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipKind {
    Search,
    Category,
    Sort,
}

/// A removable summary of one active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub kind: ChipKind,
    pub label: String,
}

/// Filter and sort selections, independent of the server query.
///
/// An empty category or search term means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategorySlug,
    pub search_term: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl FilterState {
    /// Select a category. Returns `true` if the selection changed.
    pub fn set_category(&mut self, category: CategorySlug) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        true
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.sort_field = field;
        self.sort_direction = direction;
    }

    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort_field = field;
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort_direction = direction;
    }

    /// Back to defaults. Returns `true` if a category was selected.
    pub fn reset(&mut self) -> bool {
        let had_category = !self.category.is_empty();
        *self = Self::default();
        had_category
    }

    /// Any of category, search or sort is set.
    pub fn has_active_filters(&self) -> bool {
        !self.category.is_empty() || !self.search_term.is_empty() || self.sort_field != SortField::None
    }

    /// Search or sort is set. Both only see the current page.
    pub fn is_page_scoped(&self) -> bool {
        !self.search_term.is_empty() || self.sort_field != SortField::None
    }

    /// Chips for the active filters, in display order.
    pub fn chips(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        if !self.search_term.is_empty() {
            chips.push(FilterChip {
                kind: ChipKind::Search,
                label: format!("Search: {}", self.search_term),
            });
        }
        if !self.category.is_empty() {
            chips.push(FilterChip {
                kind: ChipKind::Category,
                label: format!("Category: {}", self.category),
            });
        }
        if self.sort_field != SortField::None {
            chips.push(FilterChip {
                kind: ChipKind::Sort,
                label: format!("Sort: {} ({})", self.sort_field, self.sort_direction),
            });
        }
        chips
    }

    /// Clear the filter behind a chip. Returns `true` if the category changed.
    pub fn remove_chip(&mut self, kind: ChipKind) -> bool {
        match kind {
            ChipKind::Search => {
                self.search_term.clear();
                false
            }
            ChipKind::Category => self.set_category(CategorySlug::default()),
            ChipKind::Sort => {
                self.set_sort(SortField::None, SortDirection::Ascending);
                false
            }
        }
    }

    /// Derive the visible list: search, then category, then a stable sort.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.search_term.to_lowercase();

        let mut visible: Vec<Product> = products
            .iter()
            .filter(|p| needle.is_empty() || matches_search(p, &needle))
            .filter(|p| self.category.is_empty() || p.category == self.category)
            .cloned()
            .collect();

        if self.sort_field != SortField::None {
            let field = self.sort_field;
            match self.sort_direction {
                SortDirection::Ascending => visible.sort_by(|a, b| field.compare(a, b)),
                SortDirection::Descending => visible.sort_by(|a, b| field.compare(b, a)),
            }
        }
        visible
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    product.title.to_lowercase().contains(needle) || product.description.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::ProductId;

    fn product(id: u64, title: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            category: CategorySlug::new("beauty"),
            ..Default::default()
        }
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    fn prices(products: &[Product]) -> Vec<f64> {
        products.iter().map(|p| p.price).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let products = vec![product(1, "Red Shoe", 1.0), product(2, "Blue Hat", 1.0)];
        let mut filters = FilterState::default();
        filters.set_search("red");

        assert_eq!(titles(&filters.apply(&products)), vec!["Red Shoe"]);
    }

    #[test]
    fn test_search_matches_description() {
        let mut hat = product(2, "Blue Hat", 1.0);
        hat.description = "A wide-brimmed hat with a RED band".into();
        let products = vec![product(1, "Green Scarf", 1.0), hat];
        let mut filters = FilterState::default();
        filters.set_search("red band");

        assert_eq!(titles(&filters.apply(&products)), vec!["Blue Hat"]);
    }

    #[test]
    fn test_sort_by_price() {
        let products = vec![product(1, "a", 30.0), product(2, "b", 10.0), product(3, "c", 20.0)];
        let mut filters = FilterState::default();

        filters.set_sort(SortField::Price, SortDirection::Ascending);
        assert_eq!(prices(&filters.apply(&products)), vec![10.0, 20.0, 30.0]);

        filters.set_sort_direction(SortDirection::Descending);
        assert_eq!(prices(&filters.apply(&products)), vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn test_sort_by_title_ignores_case() {
        let products = vec![product(1, "banana", 1.0), product(2, "Apple", 1.0), product(3, "cherry", 1.0)];
        let mut filters = FilterState::default();
        filters.set_sort_field(SortField::Title);

        assert_eq!(titles(&filters.apply(&products)), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_sort_by_rating() {
        let mut low = product(1, "low", 1.0);
        low.rating = 2.5;
        let mut high = product(2, "high", 1.0);
        high.rating = 4.9;
        let mut filters = FilterState::default();
        filters.set_sort(SortField::Rating, SortDirection::Descending);

        assert_eq!(titles(&filters.apply(&[low, high])), vec!["high", "low"]);
    }

    #[test]
    fn test_equal_values_keep_original_order() {
        let products = vec![product(1, "first", 10.0), product(2, "second", 10.0), product(3, "cheap", 5.0)];
        let mut filters = FilterState::default();

        filters.set_sort(SortField::Price, SortDirection::Ascending);
        assert_eq!(titles(&filters.apply(&products)), vec!["cheap", "first", "second"]);

        filters.set_sort_direction(SortDirection::Descending);
        assert_eq!(titles(&filters.apply(&products)), vec!["first", "second", "cheap"]);
    }

    #[test]
    fn test_category_is_exact_match() {
        let mut other = product(2, "Perfume", 1.0);
        other.category = CategorySlug::new("fragrances");
        let products = vec![product(1, "Mascara", 1.0), other];
        let mut filters = FilterState::default();
        filters.set_category(CategorySlug::new("fragrance"));
        assert!(filters.apply(&products).is_empty());

        filters.set_category(CategorySlug::new("fragrances"));
        assert_eq!(titles(&filters.apply(&products)), vec!["Perfume"]);
    }

    #[test]
    fn test_predicates_commute() {
        let mut perfume = product(2, "Red Perfume", 1.0);
        perfume.category = CategorySlug::new("fragrances");
        let products = vec![product(1, "Red Lipstick", 1.0), perfume, product(3, "Mascara", 1.0)];

        let mut both = FilterState::default();
        both.set_search("red");
        both.set_category(CategorySlug::new("beauty"));

        let mut search_only = FilterState::default();
        search_only.set_search("red");
        let mut category_only = FilterState::default();
        category_only.set_category(CategorySlug::new("beauty"));

        let staged = category_only.apply(&search_only.apply(&products));
        assert_eq!(titles(&both.apply(&products)), titles(&staged));
        assert_eq!(titles(&staged), vec!["Red Lipstick"]);
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let products = vec![product(1, "b", 2.0), product(2, "a", 1.0)];
        let mut filters = FilterState::default();
        filters.set_sort_field(SortField::Price);

        let _ = filters.apply(&products);
        assert_eq!(titles(&products), vec!["b", "a"]);
    }

    #[test]
    fn test_reset_restores_defaults_exactly() {
        let mut filters = FilterState {
            category: CategorySlug::new("beauty"),
            search_term: "red".into(),
            sort_field: SortField::Rating,
            sort_direction: SortDirection::Descending,
        };
        assert!(filters.reset());
        assert_eq!(
            filters,
            FilterState {
                category: CategorySlug::new(""),
                search_term: String::new(),
                sort_field: SortField::None,
                sort_direction: SortDirection::Ascending,
            }
        );
        assert!(!filters.has_active_filters());
        assert!(!filters.reset());
    }

    #[test]
    fn test_chips() {
        let mut filters = FilterState::default();
        assert!(filters.chips().is_empty());

        filters.set_search("red");
        filters.set_category(CategorySlug::new("beauty"));
        filters.set_sort(SortField::Price, SortDirection::Descending);
        let labels: Vec<String> = filters.chips().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Search: red", "Category: beauty", "Sort: price (desc)"]);
    }

    #[test]
    fn test_remove_sort_chip_resets_direction() {
        let mut filters = FilterState::default();
        filters.set_sort(SortField::Title, SortDirection::Descending);

        assert!(!filters.remove_chip(ChipKind::Sort));
        assert_eq!(filters.sort_field, SortField::None);
        assert_eq!(filters.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn test_remove_category_chip_reports_change() {
        let mut filters = FilterState::default();
        filters.set_category(CategorySlug::new("beauty"));
        filters.set_search("x");

        assert!(filters.remove_chip(ChipKind::Category));
        assert!(filters.category.is_empty());
        assert_eq!(filters.search_term, "x");
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!("Price".parse::<SortField>(), Ok(SortField::Price));
        assert_eq!("".parse::<SortField>(), Ok(SortField::None));
        assert!("popularity".parse::<SortField>().is_err());
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
    }
}
