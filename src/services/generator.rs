//! Migration generator
//!
//! Creates the artifact a decision asks for. Tool failures come back as
//! [`Generation::Failed`] and never leave the service's pipeline.

use tracing::{info, warn};

use crate::domain::{ArtifactNaming, ConnectionSpec, MigrationDecision, ServiceDescriptor};
use crate::error::MigrationError;
use crate::infrastructure::MigrationTool;

/// What the generator did for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Nothing to create
    Skipped,
    Created(String),
    /// The tool refused because the artifact is already there
    AlreadyExisted(String),
    /// The decision was blocked; nothing was attempted
    NotAttempted,
    Failed(MigrationError),
}

impl Generation {
    /// Whether the pipeline may continue to apply
    pub fn created(&self) -> bool {
        matches!(self, Self::Skipped | Self::Created(_) | Self::AlreadyExisted(_))
    }

    pub fn into_error(self) -> Option<MigrationError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

pub struct MigrationGenerator<'a> {
    tool: &'a dyn MigrationTool,
    naming: &'a ArtifactNaming,
}

impl<'a> MigrationGenerator<'a> {
    pub fn new(tool: &'a dyn MigrationTool, naming: &'a ArtifactNaming) -> Self {
        Self { tool, naming }
    }

    pub async fn generate(
        &self,
        service: &ServiceDescriptor,
        decision: &MigrationDecision,
        connection: &ConnectionSpec,
    ) -> Generation {
        if let MigrationDecision::Blocked(_) = decision {
            return Generation::NotAttempted;
        }
        let Some(name) = self.naming.name_for(decision) else {
            return Generation::Skipped;
        };

        info!(service = %service.name, migration = %name, "Creating migration");
        match self.tool.create_artifact(service, &name, connection).await {
            Ok(()) => Generation::Created(name),
            Err(failure)
                if matches!(decision, MigrationDecision::CreateInitial)
                    && self.tool.reports_existing_artifact(&failure) =>
            {
                warn!(service = %service.name, migration = %name, "Migration already exists, continuing");
                Generation::AlreadyExisted(name)
            }
            Err(failure) => {
                let error = MigrationError::CreateFailure {
                    service: service.name.clone(),
                    migration: name,
                    reason: failure.to_string(),
                };
                warn!(service = %service.name, phase = error.phase(), "{}", error);
                Generation::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Clock;
    use crate::services::testing::{connection, service, FakeMigrationTool, FixedClock};

    #[tokio::test]
    async fn test_none_needed_does_not_invoke_tool() {
        let tool = FakeMigrationTool::new();
        let naming = ArtifactNaming::default();
        let result = MigrationGenerator::new(&tool, &naming)
            .generate(&service("Auth"), &MigrationDecision::NoneNeeded, &connection())
            .await;

        assert_eq!(result, Generation::Skipped);
        assert!(result.created());
        assert_eq!(tool.calls("create"), 0);
    }

    #[tokio::test]
    async fn test_initial_uses_canonical_name() {
        let tool = FakeMigrationTool::new();
        let naming = ArtifactNaming::default();
        let result = MigrationGenerator::new(&tool, &naming)
            .generate(&service("Backend"), &MigrationDecision::CreateInitial, &connection())
            .await;

        assert_eq!(result, Generation::Created("InitialCreate".into()));
        assert_eq!(tool.artifacts("Backend"), vec!["InitialCreate"]);
    }

    #[tokio::test]
    async fn test_initial_already_exists_counts_as_created() {
        let tool = FakeMigrationTool::new();
        tool.fail_create(
            "Backend",
            "The name 'InitialCreate' is used by an existing migration.",
        );
        let naming = ArtifactNaming::default();
        let result = MigrationGenerator::new(&tool, &naming)
            .generate(&service("Backend"), &MigrationDecision::CreateInitial, &connection())
            .await;

        assert_eq!(result, Generation::AlreadyExisted("InitialCreate".into()));
        assert!(result.created());
    }

    #[tokio::test]
    async fn test_incremental_names_do_not_collide() {
        let tool = FakeMigrationTool::new();
        let naming = ArtifactNaming::default();
        let clock = FixedClock::at(2024, 1, 1, 10, 0);
        let generator = MigrationGenerator::new(&tool, &naming);
        let backend = service("Backend");

        let first = generator
            .generate(&backend, &MigrationDecision::CreateIncremental(clock.now()), &connection())
            .await;
        clock.advance_minutes(1);
        let second = generator
            .generate(&backend, &MigrationDecision::CreateIncremental(clock.now()), &connection())
            .await;

        assert_eq!(first, Generation::Created("Auto_20240101100000".into()));
        assert_eq!(second, Generation::Created("Auto_20240101100100".into()));
    }

    #[tokio::test]
    async fn test_create_failure_is_contained() {
        let tool = FakeMigrationTool::new();
        tool.fail_create("Content", "Build failed.");
        let naming = ArtifactNaming::default();
        let result = MigrationGenerator::new(&tool, &naming)
            .generate(&service("Content"), &MigrationDecision::CreateInitial, &connection())
            .await;

        assert!(!result.created());
        match result.into_error() {
            Some(MigrationError::CreateFailure {
                service, migration, ..
            }) => {
                assert_eq!(service, "Content");
                assert_eq!(migration, "InitialCreate");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blocked_is_not_attempted() {
        let tool = FakeMigrationTool::new();
        let naming = ArtifactNaming::default();
        let result = MigrationGenerator::new(&tool, &naming)
            .generate(
                &service("Gateway"),
                &MigrationDecision::Blocked("no context".into()),
                &connection(),
            )
            .await;

        assert_eq!(result, Generation::NotAttempted);
        assert!(!result.created());
        assert_eq!(tool.calls("create"), 0);
    }
}
