//! EF Core migration tool adapter
//!
//! Runs `dotnet ef` inside each service directory. The resolved connection is
//! passed both as `--connection` (where the command accepts it) and as
//! `ConnectionStrings__{Service}Db`, which the services' design-time
//! `DbContext` factories read.
//!
//! Command lines and tool output are scrubbed with [`ConnectionSpec::scrub`]
//! before they are logged or stored in a [`ToolFailure`].

use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

use super::MigrationTool;
use crate::domain::{ConnectionSpec, PendingChanges, ServiceDescriptor};
use crate::error::ToolFailure;
use crate::tools::{get_tool_path, tools};

/// Lines of tool output kept in a failure
const FAILURE_TAIL_LINES: usize = 20;

fn pending_changes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)changes have been made to the model").expect("valid pending-changes regex")
    })
}

fn missing_context_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)no dbcontext was found|unable to create (a|an object of type) '")
            .expect("valid missing-context regex")
    })
}

fn existing_artifact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)already exists|already used|is used by an existing migration")
            .expect("valid existing-artifact regex")
    })
}

fn migration_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{14}_\w+)(\s+\(Pending\))?$").expect("valid migration id regex")
    })
}

/// Environment key the design-time context factory reads for `service`
pub fn design_time_key(service: &str) -> String {
    format!("ConnectionStrings__{}Db", service)
}

/// Captured result of one `dotnet ef` run (already scrubbed)
struct EfRun {
    command: String,
    status: ExitStatus,
    output: String,
}

impl EfRun {
    fn into_result(self) -> Result<String, ToolFailure> {
        if self.status.success() {
            Ok(self.output)
        } else {
            Err(ToolFailure::new(
                self.command,
                describe_status(&self.status),
                tail(&self.output, FAILURE_TAIL_LINES),
            ))
        }
    }
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Interpret `migrations has-pending-model-changes`.
///
/// Exit 0 means no changes. A non-zero exit only means "changes" when the tool
/// says so; anything else is indeterminate, never inferred from silence.
pub fn classify_pending(success: bool, output: &str) -> PendingChanges {
    if success {
        return PendingChanges::NoChanges;
    }
    if missing_context_re().is_match(output) {
        return PendingChanges::Indeterminate("no DbContext declared for design-time use".to_string());
    }
    if pending_changes_re().is_match(output) {
        return PendingChanges::Changes;
    }
    let last = output
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("no output");
    PendingChanges::Indeterminate(last.trim().to_string())
}

/// Extract migration IDs from `migrations list` output
pub fn parse_migration_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| migration_id_re().captures(line.trim()))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// `dotnet ef` migration tool
#[derive(Debug, Clone)]
pub struct DotnetEf {
    dotnet: String,
    migrations_dir: String,
}

impl DotnetEf {
    /// Create an adapter using `DOTNET_BIN` or `dotnet` from PATH
    pub fn new(migrations_dir: impl Into<String>) -> Self {
        Self {
            dotnet: get_tool_path(tools::DOTNET),
            migrations_dir: migrations_dir.into(),
        }
    }

    fn migrations_path(&self, service: &ServiceDescriptor) -> PathBuf {
        service.root_path.join(&self.migrations_dir)
    }

    async fn run(
        &self,
        service: &ServiceDescriptor,
        args: &[&str],
        connection: &ConnectionSpec,
    ) -> Result<EfRun, ToolFailure> {
        let command = connection.scrub(&format!("dotnet ef {}", args.join(" ")));
        debug!(service = %service.name, command = %command, "Running migration tool");

        let output = Command::new(&self.dotnet)
            .arg("ef")
            .args(args)
            .current_dir(&service.root_path)
            .env(design_time_key(&service.name), connection.resolved_value())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ToolFailure::new(command.clone(), "could not be started", e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(EfRun {
            command,
            status: output.status,
            output: connection.scrub(&text),
        })
    }
}

#[async_trait]
impl MigrationTool for DotnetEf {
    fn has_artifacts(&self, service: &ServiceDescriptor) -> bool {
        std::fs::read_dir(self.migrations_path(service))
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    async fn has_pending_model_changes(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> PendingChanges {
        match self
            .run(service, &["migrations", "has-pending-model-changes"], connection)
            .await
        {
            Ok(run) => classify_pending(run.status.success(), &run.output),
            Err(failure) => PendingChanges::Indeterminate(failure.to_string()),
        }
    }

    async fn create_artifact(
        &self,
        service: &ServiceDescriptor,
        name: &str,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure> {
        self.run(service, &["migrations", "add", name], connection)
            .await?
            .into_result()
            .map(|_| ())
    }

    async fn apply_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure> {
        self.run(
            service,
            &["database", "update", "--connection", connection.resolved_value()],
            connection,
        )
        .await?
        .into_result()
        .map(|_| ())
    }

    async fn list_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<Vec<String>, ToolFailure> {
        let output = self
            .run(
                service,
                &[
                    "migrations",
                    "list",
                    "--connection",
                    connection.resolved_value(),
                    "--no-color",
                ],
                connection,
            )
            .await?
            .into_result()?;
        Ok(parse_migration_list(&output))
    }

    fn reports_existing_artifact(&self, failure: &ToolFailure) -> bool {
        existing_artifact_re().is_match(&failure.output)
    }
}
