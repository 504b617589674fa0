//! Terminal rendering of catalog screens.

use console::style;
use serde_json::{json, Value};
use showcase_core::{Category, Product};
use showcase_view::{ErrorView, Listing, PageControls, ViewState, EMPTY_HINT, EMPTY_TITLE};

use crate::output::{rating, stock_badge, Output};

/// Page numbers shown around the current page.
const VISIBLE_PAGES: usize = 5;

/// Print the whole screen for a view state.
pub fn view_state(output: &Output, state: &ViewState) {
    if output.is_json() {
        output.json(&view_state_json(state));
        return;
    }
    match state {
        ViewState::Loading => output.info("Loading products..."),
        ViewState::Error(error) => error_view(output, error),
        ViewState::Empty(listing) => {
            header(output, listing);
            output.line("");
            output.line(&format!("  {}", style(EMPTY_TITLE).bold()));
            output.line(&format!("  {}", style(EMPTY_HINT).dim()));
            pagination(output, listing.controls.as_ref());
        }
        ViewState::Ready(listing) => {
            header(output, listing);
            output.line("");
            for product in &listing.products {
                product_card(output, product);
            }
            pagination(output, listing.controls.as_ref());
        }
    }
}

fn header(output: &Output, listing: &Listing) {
    if !listing.chips.is_empty() {
        let chips: Vec<String> = listing
            .chips
            .iter()
            .map(|chip| style(format!("[{} ×]", chip.label)).cyan().to_string())
            .collect();
        output.line(&format!("Filters: {}", chips.join(" ")));
    }

    let mut summary = style(listing.summary.to_string()).dim().to_string();
    if listing.is_refreshing {
        summary.push_str(&style(" (refreshing)").dim().italic().to_string());
    }
    output.line(&summary);
    if listing.summary.page_scoped {
        output.line(&style("(filters apply to the current page)").dim().to_string());
    }
}

fn error_view(output: &Output, error: &ErrorView) {
    output.error(error.message);
    if let Some(cause) = &error.cause {
        output.debug(cause);
    }
    output.info("Try again with `showcase browse --interactive` and choose Retry.");
}

/// One line per product in the grid.
pub fn product_card(output: &Output, product: &Product) {
    let mut price = style(product.sale_price().to_string()).bold().to_string();
    if let Some(badge) = product.discount_badge() {
        price.push_str(&format!(
            " {} {}",
            style(product.list_price().to_string()).dim(),
            style(format!("-{badge}%")).red()
        ));
    }

    output.line(&format!(
        "  {:>4}  {}  {}  {}  {}",
        style(format!("#{}", product.id)).dim(),
        style(&product.title).bold(),
        price,
        rating(product.rating),
        stock_badge(product.in_stock(), &product.availability_status),
    ));
    let mut meta = product.category.to_string();
    if let Some(brand) = &product.brand {
        meta = format!("{brand} · {meta}");
    }
    output.line(&format!("        {}", style(meta).dim()));
}

/// Detail modal for one product.
pub fn product_detail(output: &Output, product: &Product) {
    if output.is_json() {
        output.json(product);
        return;
    }

    output.header(&product.title);
    if let Some(brand) = &product.brand {
        output.kv("brand", brand);
    }
    output.kv("category", product.category.as_str());

    let mut price = product.sale_price().to_string();
    if let Some(badge) = product.discount_badge() {
        price = format!("{price} (was {}, -{badge}%)", product.list_price());
    }
    output.kv("price", &price);
    output.kv("rating", &rating(product.rating));
    output.kv(
        "stock",
        &format!(
            "{} ({} left)",
            stock_badge(product.in_stock(), &product.availability_status),
            product.stock
        ),
    );
    output.kv("minimum order", &product.minimum_order_quantity.to_string());

    output.line("");
    output.line(&product.description);

    if !product.tags.is_empty() {
        output.line("");
        output.kv("tags", &product.tags.join(", "));
    }
    if !product.shipping_information.is_empty() {
        output.kv("shipping", &product.shipping_information);
    }
    if !product.warranty_information.is_empty() {
        output.kv("warranty", &product.warranty_information);
    }

    let primary = product.primary_image();
    if !primary.is_empty() {
        output.line("");
        output.kv("image", primary);
        for image in product.secondary_images() {
            output.list_item(image);
        }
    }

    let reviews = product.review_excerpt();
    if !reviews.is_empty() {
        output.header("Reviews");
        for review in reviews {
            output.line(&format!(
                "  {}  {}",
                style(&review.reviewer_name).bold(),
                rating(review.rating)
            ));
            output.line(&format!("    {}", review.comment));
        }
    }
}

/// First/prev/numbers/next/last row.
fn pagination(output: &Output, controls: Option<&PageControls>) {
    let Some(controls) = controls else {
        return;
    };

    let mut parts = Vec::new();
    let nav = |label: &str, enabled: bool| {
        if enabled {
            label.to_string()
        } else {
            style(label).dim().to_string()
        }
    };
    parts.push(nav("«", !controls.is_first()));
    parts.push(nav("‹", controls.has_prev));
    for n in controls.page_numbers(VISIBLE_PAGES) {
        if n == controls.page {
            parts.push(style(format!("[{n}]")).bold().cyan().to_string());
        } else {
            parts.push(n.to_string());
        }
    }
    parts.push(nav("›", controls.has_next));
    parts.push(nav("»", !controls.is_last()));

    output.line("");
    output.line(&format!(
        "  {}   {}",
        parts.join(" "),
        style(format!("page {} of {}", controls.page, controls.total_pages)).dim()
    ));
}

/// Category list as slug/name rows.
pub fn categories(output: &Output, categories: &[Category]) {
    if output.is_json() {
        output.json(&categories);
        return;
    }
    output.header("Categories");
    let width = categories.iter().map(|c| c.slug.as_str().len()).max().unwrap_or(0);
    for category in categories {
        output.line(&format!(
            "  {:width$}  {}",
            category.slug.as_str(),
            style(&category.name).dim(),
            width = width
        ));
    }
}

fn view_state_json(state: &ViewState) -> Value {
    match state {
        ViewState::Loading => json!({ "status": "loading" }),
        ViewState::Error(error) => json!({
            "status": "error",
            "message": error.message,
            "cause": error.cause,
        }),
        ViewState::Empty(listing) | ViewState::Ready(listing) => {
            let status = if listing.products.is_empty() { "empty" } else { "ready" };
            json!({
                "status": status,
                "summary": listing.summary.to_string(),
                "shown": listing.summary.shown,
                "total": listing.summary.total,
                "page_scoped": listing.summary.page_scoped,
                "filters": listing.chips.iter().map(|c| c.label.clone()).collect::<Vec<_>>(),
                "page": listing.controls.map(|c| c.page).unwrap_or(1),
                "total_pages": listing.controls.map(|c| c.total_pages),
                "products": listing.products,
            })
        }
    }
}
