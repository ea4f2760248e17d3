//! CLI definitions for stackrun
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stackrun",
    version,
    about = "Run a multi-service stack locally: containers, migrations, interactive loop",
    long_about = "Starts the docker compose stack, applies EF Core migrations for every\n\
                  service that declares the tooling, then waits for commands:\n\
                  \n  migrate  run the migration pass again\
                  \n  restart  stop and start the containers\
                  \n  quit     stop the containers and exit"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (compose files, .env, services directory)
    #[arg(long, global = true, env = "STACKRUN_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Config file (default: <project-root>/stackrun.yaml if present)
    #[arg(long, global = true, env = "STACKRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Services directory, overrides the config file
    #[arg(long, global = true, env = "STACKRUN_SERVICES_DIR")]
    pub services_dir: Option<PathBuf>,

    /// Environment file, overrides the config file
    #[arg(long, global = true, env = "STACKRUN_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Print STACKRUN_EVENT: JSON lines for passes and stack actions
    #[arg(long, global = true, env = "STACKRUN_EVENTS")]
    pub events: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start containers, run migrations, then wait for commands
    Up {
        /// Run an extra migration pass before entering the command loop
        #[arg(long)]
        migrate: bool,
    },

    /// Run one migration pass and exit
    Migrate,

    /// Stop the containers
    Down,

    /// List migration-eligible services and why others are skipped
    Discover,
}
