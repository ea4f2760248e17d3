use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod observability;
mod services;
mod tools;
mod ui;

use cli::{Cli, Commands};
use commands::{discover, down, migrate, up, StackContext};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    let ctx = StackContext::from_cli(&cli)?;

    match cli.command {
        Commands::Up { migrate: twice } => up::execute(&ctx, twice).await?,
        Commands::Migrate => migrate::execute(&ctx).await?,
        Commands::Down => down::execute(&ctx).await?,
        Commands::Discover => discover::execute(&ctx)?,
    }

    Ok(())
}
