//! The product command.

use anyhow::{bail, Result};
use showcase_core::CatalogError;

use super::ProductArgs;
use crate::context::Context;
use crate::render;

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    if args.id.get() == 0 {
        bail!("Product id must be at least 1");
    }

    let queries = ctx.queries()?;
    let mut events = queries.events();
    let boundary = ctx.error_boundary();

    let spinner = ctx.output.spinner(&format!("Loading product {}...", args.id));
    let state = queries.product(args.id).await;
    spinner.finish_and_clear();
    boundary.drain(&mut events);

    match (state.data, state.error) {
        (_, Some(CatalogError::NotFound(id))) => bail!("Product {id} does not exist"),
        (_, Some(error)) => Err(error.into()),
        (Some(product), None) => {
            render::product_detail(&ctx.output, &product);
            Ok(())
        }
        (None, None) => bail!("Product {} was not loaded", args.id),
    }
}
