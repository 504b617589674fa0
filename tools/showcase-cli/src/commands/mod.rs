//! CLI command implementations.

pub mod browse;
pub mod categories;
pub mod config;
pub mod interactive;
pub mod product;

use clap::Args;
use showcase_core::ProductId;
use showcase_view::SortField;

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Page to show (1-indexed).
    #[arg(short, long, default_value = "1")]
    pub page: u32,

    /// Category slug to browse, e.g. "smartphones".
    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive text to find in titles and descriptions.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort field: price, title or rating.
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Sort descending.
    #[arg(long)]
    pub desc: bool,

    /// Keep the session open and drive it from a menu.
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product id.
    pub id: ProductId,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    /// Print every setting as TOML.
    #[arg(long)]
    pub show: bool,
}
