//! scriptweave: assembles scripts linked by `//@import(path)` directives.
//!
//! Usage:
//!   scriptweave --base https://cdn.example/js/ app/main.js
//!   scriptweave -o bundle.js main.js page.js
//!   scriptweave -e node --arg - main.js
//!
//! Logs go to stderr; with no `--output` or `--exec` the assembled source
//! is written to stdout.

use anyhow::Result;
use clap::Parser;
use scriptweave_cli::Args;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let source = scriptweave_cli::run(&args).await?;
    info!("Done: {} bytes assembled", source.len());
    Ok(())
}
