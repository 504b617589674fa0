//! Product and review types.

use crate::ids::{CategorySlug, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Number of reviews shown in the detail view.
pub const REVIEW_EXCERPT_LEN: usize = 3;

/// Number of secondary images shown in the detail view.
pub const SECONDARY_IMAGE_LEN: usize = 3;

/// A customer review attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Display name of the reviewer.
    pub reviewer_name: String,
    /// Rating from 0 to 5.
    pub rating: f64,
    /// Review text.
    #[serde(default)]
    pub comment: String,
}

/// A product in the remote catalog.
///
/// Unknown fields in the payload are ignored; display-only fields that some
/// catalog entries omit default to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Category slug.
    pub category: CategorySlug,
    /// Brand name. Some product families (groceries) have none.
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// List price, non-negative.
    pub price: f64,
    /// Discount in percent, 0 to 100.
    #[serde(default)]
    pub discount_percentage: f64,
    /// Average rating, 0 to 5.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_minimum_order_quantity")]
    pub minimum_order_quantity: u32,
    /// Free-text status label, e.g. "In Stock" or "Low Stock".
    #[serde(default)]
    pub availability_status: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Image URLs; the first is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub shipping_information: String,
    #[serde(default)]
    pub warranty_information: String,
}

fn default_minimum_order_quantity() -> u32 {
    1
}

impl Product {
    /// Price after applying the discount percentage.
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.discount_percentage / 100.0)
    }

    /// Discounted price as a display amount.
    pub fn sale_price(&self) -> Money {
        Money::from_decimal(self.discounted_price())
    }

    /// List price as a display amount.
    pub fn list_price(&self) -> Money {
        Money::from_decimal(self.price)
    }

    /// Whether a discount applies.
    pub fn has_discount(&self) -> bool {
        self.discount_percentage > 0.0
    }

    /// Discount badge percentage, rounded to the nearest whole percent.
    pub fn discount_badge(&self) -> Option<i64> {
        self.has_discount()
            .then(|| self.discount_percentage.round() as i64)
    }

    /// Whether at least one unit is in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Primary image: the first gallery image, falling back to the thumbnail.
    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or(self.thumbnail.as_str())
    }

    /// Gallery images after the primary one, capped for the detail view.
    pub fn secondary_images(&self) -> &[String] {
        match self.images.len() {
            0 | 1 => &[],
            n => &self.images[1..n.min(1 + SECONDARY_IMAGE_LEN)],
        }
    }

    /// Reviews shown in the detail view.
    pub fn review_excerpt(&self) -> &[Review] {
        &self.reviews[..self.reviews.len().min(REVIEW_EXCERPT_LEN)]
    }
}
