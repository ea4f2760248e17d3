//! Migration state prober
//!
//! Derives a [`MigrationDecision`] from on-disk artifacts and the tool's own
//! pending-changes check. Nothing is cached between passes.

use tracing::{debug, info};

use crate::domain::{Clock, ConnectionSpec, MigrationDecision, PendingChanges, ServiceDescriptor};
use crate::infrastructure::MigrationTool;

pub struct MigrationProber<'a> {
    tool: &'a dyn MigrationTool,
    clock: &'a dyn Clock,
}

impl<'a> MigrationProber<'a> {
    pub fn new(tool: &'a dyn MigrationTool, clock: &'a dyn Clock) -> Self {
        Self { tool, clock }
    }

    pub async fn probe(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> MigrationDecision {
        if !self.tool.has_artifacts(service) {
            info!(service = %service.name, "No migrations found: initial migration required");
            return MigrationDecision::CreateInitial;
        }

        match self.tool.has_pending_model_changes(service, connection).await {
            PendingChanges::NoChanges => {
                debug!(service = %service.name, "Model matches latest migration");
                MigrationDecision::NoneNeeded
            }
            PendingChanges::Changes => {
                let at = self.clock.now();
                info!(service = %service.name, "Model has pending changes: new migration required");
                MigrationDecision::CreateIncremental(at)
            }
            PendingChanges::Indeterminate(reason) => MigrationDecision::Blocked(reason),
        }
    }
}
