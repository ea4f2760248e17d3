//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - docker compose (container stack lifecycle)
//! - `dotnet ef` (migration tool)
//! - `.env` file + process environment (credential source)
//!
//! The orchestration services only see the traits defined here, so tests can
//! drive them with in-memory fakes.

pub mod docker;
pub mod dotnet_ef;
pub mod env_file;

// Re-export commonly used types
pub use docker::DockerCompose;
pub use dotnet_ef::DotnetEf;
pub use env_file::EnvSource;

use async_trait::async_trait;

use crate::domain::{ConnectionSpec, PendingChanges, ServiceDescriptor};
use crate::error::{ContainerError, ToolFailure};

/// Container stack lifecycle, used only between migration passes
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn start_stack(&self) -> Result<(), ContainerError>;
    async fn stop_stack(&self) -> Result<(), ContainerError>;
}

/// Opaque migration tool capabilities
///
/// Every call blocks the pass until the tool exits; there is no timeout.
#[async_trait]
pub trait MigrationTool: Send + Sync {
    /// Migration artifact directory exists and is non-empty
    fn has_artifacts(&self, service: &ServiceDescriptor) -> bool;

    /// Ask the tool whether the model differs from the latest artifact
    async fn has_pending_model_changes(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> PendingChanges;

    /// Generate a new artifact called `name`
    async fn create_artifact(
        &self,
        service: &ServiceDescriptor,
        name: &str,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure>;

    /// Bring the database up to the latest artifact
    async fn apply_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure>;

    /// Artifact names known to the tool, oldest first
    async fn list_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<Vec<String>, ToolFailure>;

    /// Whether a failed create means the artifact already exists
    fn reports_existing_artifact(&self, failure: &ToolFailure) -> bool;
}
