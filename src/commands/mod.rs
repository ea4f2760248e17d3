//! Subcommand implementations
//!
//! Each command exposes an `execute` entry point; shared wiring (config,
//! environment source, adapters) lives in [`StackContext`].

pub mod discover;
pub mod down;
pub mod migrate;
pub mod session;
pub mod up;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::Cli;
use crate::config::StackConfig;
use crate::domain::{Clock, PassReport};
use crate::infrastructure::{DockerCompose, DotnetEf, EnvSource, MigrationTool};
use crate::observability;
use crate::services::{CredentialResolver, MigrationService};
use crate::tools::{locate, tools};
use crate::ui;

/// Everything a command needs to know about the project
#[derive(Debug, Clone)]
pub struct StackContext {
    pub project_root: PathBuf,
    pub config: StackConfig,
    pub services_root: PathBuf,
    pub env_file: PathBuf,
    pub emit_events: bool,
}

impl StackContext {
    /// Load config and apply CLI overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_root = cli.project_root.clone();
        if !project_root.is_dir() {
            anyhow::bail!("Project root {} is not a directory", project_root.display());
        }

        let mut config = StackConfig::load(&project_root, cli.config.as_deref())
            .context("Failed to load stackrun configuration")?;
        if let Some(dir) = &cli.services_dir {
            config.services_dir = dir.clone();
        }
        if let Some(file) = &cli.env_file {
            config.env_file = file.clone();
        }

        let services_root = config.services_root(&project_root);
        let env_file = config.env_file_path(&project_root);
        debug!(
            project_root = %project_root.display(),
            services_root = %services_root.display(),
            env_file = %env_file.display(),
            "Resolved project layout"
        );

        Ok(Self {
            project_root,
            config,
            services_root,
            env_file,
            emit_events: cli.events,
        })
    }

    /// Migration service backed by `dotnet ef` and the loaded environment
    pub fn migration_service(&self) -> MigrationService<DotnetEf> {
        let settings = &self.config.migrations;
        let env = EnvSource::load(&self.env_file);
        debug!(env_file_loaded = env.file_loaded(), "Environment source ready");
        let resolver = CredentialResolver::new(env, settings);
        MigrationService::new(DotnetEf::new(settings.migrations_dir.clone()), resolver, settings)
    }

    /// Compose stack for the project root
    pub fn container_runtime(&self) -> DockerCompose {
        DockerCompose::new(&self.project_root, self.config.compose.clone())
    }
}

/// Warn once about every tool that cannot be found
pub fn preflight(required: &[&str]) {
    for tool in required {
        match locate(tool) {
            Some(path) => debug!("Using {} at {}", tool, path.display()),
            None => ui::print_warning(&format!(
                "`{}` not found (set {}_BIN or add it to PATH)",
                tool,
                tool.to_uppercase()
            )),
        }
    }
}

/// Tools every migration pass needs
pub const MIGRATION_TOOLS: &[&str] = &[tools::DOTNET];

/// Run one pass and show its report
pub async fn run_reported_pass<T: MigrationTool, K: Clock>(
    migrations: &MigrationService<T, K>,
    services_root: &Path,
    emit_events: bool,
) -> PassReport {
    let report = migrations.run_migration_pass(services_root).await;
    ui::print_pass_report(&report);
    if emit_events {
        observability::emit_pass_report(&report);
    }
    report
}
