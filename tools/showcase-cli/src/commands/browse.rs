//! The browse command.

use anyhow::{anyhow, Context as _, Result};
use chrono::Local;
use showcase_core::CategorySlug;
use showcase_view::{CatalogView, SortDirection, ViewState, LOAD_ERROR_MESSAGE};

use super::{interactive, BrowseArgs};
use crate::context::Context;
use crate::render;

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let queries = ctx.queries()?;
    let mut events = queries.events();
    let boundary = ctx.error_boundary();
    let mut view = ctx.view(queries);

    apply_args(&mut view, &args)?;

    if args.interactive {
        return interactive::run(&mut view, ctx, &boundary, &mut events).await;
    }

    let mut state = load(&mut view, ctx).await;
    if !view.filters().category.is_empty() && !state.is_error() {
        // The summary names the category once the list is in.
        view.load_categories().await;
        state = view.render();
    }
    boundary.drain(&mut events);

    if let ViewState::Error(error) = &state {
        let cause = error.cause.clone().unwrap_or_default();
        return Err(anyhow!(cause)).context(LOAD_ERROR_MESSAGE);
    }
    render::view_state(&ctx.output, &state);
    Ok(())
}

fn apply_args(view: &mut CatalogView, args: &BrowseArgs) -> Result<()> {
    if let Some(category) = &args.category {
        view.set_category(CategorySlug::new(category.trim()));
    }
    if let Some(search) = &args.search {
        view.set_search(search.as_str());
    }
    if let Some(field) = args.sort {
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        view.set_sort(field, direction);
    }
    view.go_to_page(args.page)?;
    Ok(())
}

/// Load the current window behind a spinner.
pub async fn load(view: &mut CatalogView, ctx: &Context) -> ViewState {
    let spinner = ctx.output.spinner("Loading products...");
    let state = view.load().await;
    spinner.finish_and_clear();

    if let Some(info) = view.queries().page_cache().entry_info(&view.current_request().key()) {
        let updated = info
            .updated_at
            .map(|at| at.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        ctx.output.debug(&format!(
            "page {} is {}{}, updated {}",
            view.current_request().key(),
            info.status,
            if info.is_stale { " (stale)" } else { "" },
            updated
        ));
    }
    state
}
