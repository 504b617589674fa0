//! Menu-driven browsing session.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use showcase_cache::QueryEvent;
use showcase_core::CategorySlug;
use showcase_view::{
    CatalogView, ErrorBoundary, SortDirection, SortField, Toast, ViewState, CART_NOT_INTEGRATED,
};
use tokio::sync::broadcast;

use super::browse::load;
use crate::context::Context;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    First,
    Last,
    GoTo,
    Category,
    Search,
    Sort,
    ToggleDirection,
    RemoveFilter,
    Clear,
    Details,
    Retry,
    Refresh,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Next => "Next page",
            Action::Prev => "Previous page",
            Action::First => "First page",
            Action::Last => "Last page",
            Action::GoTo => "Go to page...",
            Action::Category => "Category...",
            Action::Search => "Search...",
            Action::Sort => "Sort...",
            Action::ToggleDirection => "Reverse sort direction",
            Action::RemoveFilter => "Remove a filter...",
            Action::Clear => "Clear filters",
            Action::Details => "Product details...",
            Action::Retry => "Try again",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        }
    }
}

/// Actions that make sense for what is on screen.
fn actions(state: &ViewState, view: &CatalogView) -> Vec<Action> {
    let listing = match state {
        ViewState::Error(_) => return vec![Action::Retry, Action::Quit],
        ViewState::Loading => return vec![Action::Refresh, Action::Quit],
        ViewState::Empty(listing) | ViewState::Ready(listing) => listing,
    };

    let mut actions = Vec::new();
    if let Some(controls) = listing.controls {
        if controls.has_next {
            actions.push(Action::Next);
        }
        if controls.has_prev {
            actions.push(Action::Prev);
        }
        if !controls.is_first() {
            actions.push(Action::First);
        }
        if !controls.is_last() {
            actions.push(Action::Last);
        }
        actions.push(Action::GoTo);
    }
    if !listing.products.is_empty() {
        actions.push(Action::Details);
    }
    actions.extend([Action::Category, Action::Search, Action::Sort]);
    if view.filters().sort_field != SortField::None {
        actions.push(Action::ToggleDirection);
    }
    if !listing.chips.is_empty() {
        actions.extend([Action::RemoveFilter, Action::Clear]);
    }
    actions.extend([Action::Refresh, Action::Quit]);
    actions
}

/// Run the session until the user quits.
pub async fn run(
    view: &mut CatalogView,
    ctx: &Context,
    boundary: &ErrorBoundary,
    events: &mut broadcast::Receiver<QueryEvent>,
) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut state = load(view, ctx).await;
    boundary.drain(events);

    loop {
        render::view_state(&ctx.output, &state);

        let actions = actions(&state, view);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            break;
        };
        ctx.output.clear();

        // Coming back from the prompt counts as regaining focus.
        view.focus();

        match actions[choice] {
            Action::Quit => break,
            Action::Retry => {
                state = view.retry().await;
                boundary.drain(events);
                continue;
            }
            Action::Next => {
                view.next_page()?;
            }
            Action::Prev => {
                view.prev_page()?;
            }
            Action::First => view.first_page()?,
            Action::Last => {
                view.last_page()?;
            }
            Action::GoTo => {
                let page: u32 = Input::with_theme(&theme).with_prompt("Page").interact_text()?;
                if let Err(e) = view.go_to_page(page) {
                    ctx.output.warn(&e.to_string());
                }
            }
            Action::Category => {
                view.load_categories().await;
                boundary.drain(events);
                pick_category(view, &theme)?;
            }
            Action::Search => {
                let term: String = Input::with_theme(&theme)
                    .with_prompt("Search")
                    .with_initial_text(view.filters().search_term.clone())
                    .allow_empty(true)
                    .interact_text()?;
                view.set_search(term.trim());
            }
            Action::Sort => pick_sort(view, &theme)?,
            Action::ToggleDirection => {
                let direction = view.filters().sort_direction.toggled();
                view.set_sort_direction(direction);
            }
            Action::RemoveFilter => pick_chip(view, &state, &theme)?,
            Action::Clear => view.clear_filters(),
            Action::Details => show_details(view, &state, ctx, &theme)?,
            Action::Refresh => {}
        }

        state = load(view, ctx).await;
        boundary.drain(events);
    }
    Ok(())
}

fn pick_category(view: &mut CatalogView, theme: &ColorfulTheme) -> Result<()> {
    let categories = view.categories().to_vec();
    let mut labels = vec!["All Categories".to_string()];
    labels.extend(categories.iter().map(|c| c.name.clone()));

    let current = categories
        .iter()
        .position(|c| c.slug == view.filters().category)
        .map_or(0, |i| i + 1);
    let Some(choice) = Select::with_theme(theme)
        .with_prompt("Category")
        .items(&labels)
        .default(current)
        .interact_opt()?
    else {
        return Ok(());
    };

    let slug = match choice {
        0 => CategorySlug::default(),
        i => categories[i - 1].slug.clone(),
    };
    view.set_category(slug);
    Ok(())
}

fn pick_sort(view: &mut CatalogView, theme: &ColorfulTheme) -> Result<()> {
    let mut fields = vec![SortField::None];
    fields.extend(SortField::SELECTABLE);
    let labels: Vec<&str> = fields.iter().map(SortField::display_name).collect();
    let current = fields
        .iter()
        .position(|f| *f == view.filters().sort_field)
        .unwrap_or(0);

    let Some(field) = Select::with_theme(theme)
        .with_prompt("Sort by")
        .items(&labels)
        .default(current)
        .interact_opt()?
    else {
        return Ok(());
    };
    let field = fields[field];
    if field == SortField::None {
        view.set_sort(SortField::None, SortDirection::Ascending);
        return Ok(());
    }

    let directions = [SortDirection::Ascending, SortDirection::Descending];
    let labels: Vec<&str> = directions.iter().map(SortDirection::display_name).collect();
    let current = usize::from(view.filters().sort_direction == SortDirection::Descending);
    let direction = Select::with_theme(theme)
        .with_prompt("Direction")
        .items(&labels)
        .default(current)
        .interact_opt()?
        .map_or(view.filters().sort_direction, |i| directions[i]);

    view.set_sort(field, direction);
    Ok(())
}

fn pick_chip(view: &mut CatalogView, state: &ViewState, theme: &ColorfulTheme) -> Result<()> {
    let Some(listing) = state.listing() else {
        return Ok(());
    };
    let labels: Vec<&str> = listing.chips.iter().map(|c| c.label.as_str()).collect();
    if let Some(i) = Select::with_theme(theme)
        .with_prompt("Remove")
        .items(&labels)
        .interact_opt()?
    {
        view.remove_chip(listing.chips[i].kind);
    }
    Ok(())
}

fn show_details(
    view: &mut CatalogView,
    state: &ViewState,
    ctx: &Context,
    theme: &ColorfulTheme,
) -> Result<()> {
    let Some(listing) = state.listing() else {
        return Ok(());
    };
    let labels: Vec<String> = listing
        .products
        .iter()
        .map(|p| format!("#{} {}", p.id, p.title))
        .collect();
    let Some(choice) = Select::with_theme(theme)
        .with_prompt("Product")
        .items(&labels)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    view.show_details(listing.products[choice].clone());
    while let Some(product) = view.modal().selected_product() {
        render::product_detail(&ctx.output, product);

        let action = Select::with_theme(theme)
            .items(&["Add to Cart", "Close"])
            .default(1)
            .interact_opt()?;
        if action == Some(0) {
            ctx.output.toast(&Toast::success(CART_NOT_INTEGRATED));
        } else {
            view.close_details();
        }
    }
    Ok(())
}
