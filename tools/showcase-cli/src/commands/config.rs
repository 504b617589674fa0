//! The config command.

use anyhow::Result;

use super::ConfigArgs;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    if args.show {
        print!("{}", ctx.config.to_toml()?);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("api.base_url", &ctx.config.api.base_url);
    ctx.output.kv("api.timeout_secs", &ctx.config.api.timeout_secs.to_string());
    ctx.output.kv("cache.product_stale_secs", &ctx.config.cache.product_stale_secs.to_string());
    ctx.output.kv("cache.category_stale_secs", &ctx.config.cache.category_stale_secs.to_string());
    ctx.output.kv("cache.retries", &ctx.config.cache.retries.to_string());
    ctx.output.kv("cache.refetch_on_focus", &ctx.config.cache.refetch_on_focus.to_string());
    ctx.output.kv("view.page_size", &ctx.config.view.page_size.to_string());
    Ok(())
}
