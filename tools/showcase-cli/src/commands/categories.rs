//! The categories command.

use anyhow::{anyhow, Context as _, Result};

use crate::context::Context;
use crate::render;

/// Run the categories command.
pub async fn run(ctx: &Context) -> Result<()> {
    let queries = ctx.queries()?;
    let mut events = queries.events();
    let boundary = ctx.error_boundary();

    let spinner = ctx.output.spinner("Loading categories...");
    let state = queries.categories().await;
    spinner.finish_and_clear();
    boundary.drain(&mut events);

    if let Some(error) = state.error {
        return Err(anyhow!(error)).context("Failed to load categories");
    }
    render::categories(&ctx.output, state.data.as_deref().unwrap_or_default());
    Ok(())
}
