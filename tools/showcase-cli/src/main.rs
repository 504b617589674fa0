//! Showcase CLI - Browse the product catalog from a terminal.
//!
//! Commands:
//! - `showcase browse` - Render one page of the catalog, or drive it interactively
//! - `showcase product` - Show the detail view for one product
//! - `showcase categories` - List categories
//! - `showcase config` - Show the effective configuration

mod commands;
mod context;
mod logger;
mod output;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BrowseArgs, ConfigArgs, ProductArgs};

/// Environment variable overriding the catalog base URL.
const API_URL_ENV: &str = "SHOWCASE_API_URL";

/// Showcase CLI - Browse, filter and sort a remote product catalog
#[derive(Parser)]
#[command(name = "showcase")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Catalog API base URL
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a page of products
    Browse(BrowseArgs),

    /// Show details for one product
    Product(ProductArgs),

    /// List product categories
    Categories,

    /// Show configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.json)?;

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), cli.api_url, output)?;

    let result = match cli.command {
        Commands::Browse(args) => commands::browse::run(args, &ctx).await,
        Commands::Product(args) => commands::product::run(args, &ctx).await,
        Commands::Categories => commands::categories::run(&ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
