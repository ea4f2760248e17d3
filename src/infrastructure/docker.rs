//! docker compose stack lifecycle
//!
//! Output is inherited so compose progress shows up in the terminal as usual.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::info;

use super::ContainerRuntime;
use crate::config::ComposeSettings;
use crate::error::ContainerError;
use crate::tools::{get_tool_path, tools};

/// Compose-managed stack rooted at the project directory
#[derive(Debug, Clone)]
pub struct DockerCompose {
    docker: String,
    project_root: PathBuf,
    settings: ComposeSettings,
}

impl DockerCompose {
    pub fn new(project_root: impl Into<PathBuf>, settings: ComposeSettings) -> Self {
        Self {
            docker: get_tool_path(tools::DOCKER),
            project_root: project_root.into(),
            settings,
        }
    }

    fn compose_args(&self, action: &[&str]) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        for file in &self.settings.files {
            args.push("-f".to_string());
            args.push(file.clone());
        }
        args.extend(action.iter().map(|a| a.to_string()));
        args
    }

    fn up_args(&self) -> Vec<String> {
        let mut action = vec!["up", "-d"];
        if self.settings.build {
            action.push("--build");
        }
        self.compose_args(&action)
    }

    fn down_args(&self) -> Vec<String> {
        self.compose_args(&["down"])
    }

    async fn run(&self, args: &[String]) -> Result<(), ContainerError> {
        let command = format!("docker {}", args.join(" "));
        let status = Command::new(&self.docker)
            .args(args)
            .current_dir(&self.project_root)
            .status()
            .await
            .map_err(|e| ContainerError::SpawnFailed {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(ContainerError::CommandFailed {
                command,
                status: status
                    .code()
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "a signal".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for DockerCompose {
    async fn start_stack(&self) -> Result<(), ContainerError> {
        if let Some(volume) = &self.settings.volume {
            info!("Creating {} volume...", volume);
            self.run(&["volume".to_string(), "create".to_string(), volume.clone()])
                .await?;
        }

        info!("Starting Docker containers...");
        self.run(&self.up_args()).await?;
        info!("Docker containers started");
        Ok(())
    }

    async fn stop_stack(&self) -> Result<(), ContainerError> {
        info!("Stopping Docker containers...");
        self.run(&self.down_args()).await?;
        info!("Docker containers stopped");
        Ok(())
    }
}
