//! Interactive command loop
//!
//! Reads one command per line after the stack is up:
//!
//! - `migrate` runs another migration pass
//! - `restart` stops and starts the containers
//! - `quit` (or end of input) stops the containers and returns

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::run_reported_pass;
use crate::domain::Clock;
use crate::infrastructure::{ContainerRuntime, MigrationTool};
use crate::observability;
use crate::services::MigrationService;
use crate::ui;

const PROMPT: &str = "Waiting for further commands (migrate/restart/quit): ";
const USAGE: &str = "Unknown command. Use migrate, restart or quit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Migrate,
    Restart,
    Quit,
}

/// Parse one input line, ignoring case and surrounding whitespace
pub fn parse_command(input: &str) -> Option<SessionCommand> {
    match input.trim().to_lowercase().as_str() {
        "migrate" => Some(SessionCommand::Migrate),
        "restart" => Some(SessionCommand::Restart),
        "quit" => Some(SessionCommand::Quit),
        _ => None,
    }
}

pub struct Session<'a, T: MigrationTool, K: Clock> {
    runtime: &'a dyn ContainerRuntime,
    migrations: &'a MigrationService<T, K>,
    services_root: &'a Path,
    emit_events: bool,
}

impl<'a, T: MigrationTool, K: Clock> Session<'a, T, K> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        migrations: &'a MigrationService<T, K>,
        services_root: &'a Path,
        emit_events: bool,
    ) -> Self {
        Self {
            runtime,
            migrations,
            services_root,
            emit_events,
        }
    }

    /// Serve commands from stdin
    pub async fn run(&self) -> Result<()> {
        self.run_with_input(BufReader::new(tokio::io::stdin())).await
    }

    pub async fn run_with_input<R: AsyncBufRead + Unpin>(&self, input: R) -> Result<()> {
        let mut lines = input.lines();

        loop {
            print!("{}", PROMPT);
            std::io::stdout().flush().ok();

            let line = lines
                .next_line()
                .await
                .context("Failed to read command from stdin")?;

            let Some(line) = line else {
                println!();
                debug!("Input closed, shutting down");
                self.quit().await;
                return Ok(());
            };

            match parse_command(&line) {
                Some(SessionCommand::Migrate) => {
                    run_reported_pass(self.migrations, self.services_root, self.emit_events).await;
                }
                Some(SessionCommand::Restart) => self.restart().await,
                Some(SessionCommand::Quit) => {
                    self.quit().await;
                    return Ok(());
                }
                None if line.trim().is_empty() => {}
                None => ui::print_warning(USAGE),
            }
        }
    }

    async fn restart(&self) {
        info!("Restarting Docker containers...");
        let result = match self.runtime.stop_stack().await {
            Ok(()) => self.runtime.start_stack().await,
            Err(e) => Err(e),
        };
        self.report("restart", result.map_err(|e| e.to_string()));
    }

    async fn quit(&self) {
        let result = self.runtime.stop_stack().await;
        self.report("stop", result.map_err(|e| e.to_string()));
    }

    fn report(&self, action: &str, result: Result<(), String>) {
        match &result {
            Ok(()) => ui::print_success(&format!("Stack {} complete", action)),
            Err(e) => ui::print_error(&format!("Stack {} failed: {}", action, e)),
        }
        if self.emit_events {
            observability::emit_lifecycle(action, result.err());
        }
    }
}
