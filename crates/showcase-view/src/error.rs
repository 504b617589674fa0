//! View errors.

use thiserror::Error;

/// Errors from invalid user navigation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Pages are 1-indexed.
    #[error("Page must be at least 1, got {0}")]
    InvalidPage(u32),

    /// The page starts past the largest offset the server accepts.
    #[error("Page {0} is out of range")]
    PageOutOfRange(u32),

    /// No product with this id on the current page.
    #[error("Product {0} is not on the current page")]
    NotOnPage(u64),
}

/// Result type for view operations.
pub type ViewResult<T> = std::result::Result<T, ViewError>;
