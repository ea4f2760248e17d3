//! Migration applier

use tracing::{debug, info, warn};

use crate::domain::{ConnectionSpec, ServiceDescriptor};
use crate::error::MigrationError;
use crate::infrastructure::MigrationTool;

pub struct MigrationApplier<'a> {
    tool: &'a dyn MigrationTool,
    list_after_apply: bool,
}

impl<'a> MigrationApplier<'a> {
    pub fn new(tool: &'a dyn MigrationTool) -> Self {
        Self {
            tool,
            list_after_apply: false,
        }
    }

    pub fn with_listing(mut self, list_after_apply: bool) -> Self {
        self.list_after_apply = list_after_apply;
        self
    }

    /// Apply every artifact for `service`.
    ///
    /// Applying an up-to-date schema is a tool-level no-op; the tool's
    /// result is reported as-is.
    pub async fn apply(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<(), MigrationError> {
        info!(service = %service.name, connection = %connection.masked(), "Applying migrations");

        if let Err(failure) = self.tool.apply_artifacts(service, connection).await {
            let error = MigrationError::ApplyFailure {
                service: service.name.clone(),
                reason: failure.to_string(),
            };
            warn!(service = %service.name, phase = error.phase(), "{}", error);
            return Err(error);
        }

        if self.list_after_apply {
            match self.tool.list_artifacts(service, connection).await {
                Ok(names) => debug!(service = %service.name, migrations = ?names, "Applied migrations"),
                Err(failure) => debug!(service = %service.name, "Could not list migrations: {}", failure),
            }
        }

        Ok(())
    }
}
